//! WebP encoding for converted uploads.
//!
//! Output is lossy WebP from libwebp at the encoder's default quality. No
//! quality knob is exposed to callers.

use thiserror::Error;

use crate::decode::BYTES_PER_PIXEL;

/// Largest width or height a WebP bitstream can describe.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// libwebp's default `WebPConfig` quality.
pub const WEBP_DEFAULT_QUALITY: f32 = 75.0;

/// Errors that can occur during WebP encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero or beyond the WebP limit
    #[error("Invalid dimensions: {width}x{height} (each side must be 1 to 16383)")]
    InvalidDimensions { width: u32, height: u32 },

    /// WebP encoding failed
    #[error("WebP encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode RGBA pixel data to WebP bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
///
/// A complete `RIFF....WEBP` container on success.
pub fn encode_webp(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 || width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let encoded = webp::Encoder::from_rgba(pixels, width, height)
        .encode_simple(false, WEBP_DEFAULT_QUALITY)
        .map_err(|e| EncodeError::EncodingFailed(format!("{:?}", e)))?;

    Ok(encoded.to_vec())
}

/// Check for the RIFF/WEBP container signature.
pub fn is_webp(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}


// ============================================================================
// Property-Based Tests
// ============================================================================
