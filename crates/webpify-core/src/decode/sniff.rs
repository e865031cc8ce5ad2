//! Format-sniffing image decoding.
//!
//! The declared media type of a file is never trusted for decoding. The
//! format is guessed from the leading bytes, the way a browser `<img>` does.

use std::io::Cursor;

use image::{ImageError, ImageReader};

use super::{Bitmap, DecodeError};

/// Decode any supported raster format (JPEG, PNG, GIF, BMP, WebP) to RGBA8.
///
/// No EXIF orientation correction is applied: pixels come out exactly as
/// stored in the file.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if the data is truncated or malformed.
pub fn decode_image(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    Ok(Bitmap::from_rgba_image(img.into_rgba8()))
}
