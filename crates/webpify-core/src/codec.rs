//! Decode/encode capability used by the converter.
//!
//! In a browser these steps belong to `<img>` and `canvas.toBlob`. Here they
//! sit behind [`ImageCodec`] so the pipeline runs the same on any target;
//! [`NativeCodec`] decodes with the `image` crate and encodes with libwebp.

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::decode::{self, Bitmap, DecodeError};
use crate::encode::{self, EncodeError};

/// Output formats the pipeline can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    WebP,
}

impl OutputFormat {
    /// IANA media type of the encoded output.
    pub fn media_type(self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// Platform image decoder and encoder.
pub trait ImageCodec {
    /// Decode file bytes into a pixel bitmap.
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, DecodeError>;

    /// Encode a raster surface at the encoder's default setting.
    fn encode(&self, surface: &Surface, format: OutputFormat) -> Result<Vec<u8>, EncodeError>;
}

/// Off-screen RGBA raster, the equivalent of a 2D canvas.
///
/// A fresh surface is fully transparent.
#[derive(Debug, Clone)]
pub struct Surface {
    raster: RgbaImage,
}

impl Surface {
    /// Allocate a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: RgbaImage::new(width, height),
        }
    }

    /// Allocate a surface exactly the size of `bitmap` and draw it at (0, 0).
    pub fn from_bitmap(bitmap: &Bitmap) -> Self {
        let mut surface = Self::new(bitmap.width, bitmap.height);
        surface.draw(bitmap, 0, 0);
        surface
    }

    /// Copy `bitmap` onto the surface with its top-left corner at (x, y).
    ///
    /// Pixels are replaced, not blended. Parts falling outside the surface
    /// are clipped. A bitmap whose buffer does not match its dimensions is
    /// ignored.
    pub fn draw(&mut self, bitmap: &Bitmap, x: i64, y: i64) {
        if let Some(src) = bitmap.as_rgba_image() {
            imageops::replace(&mut self.raster, &src, x, y);
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Raw RGBA bytes in row-major order.
    pub fn pixels(&self) -> &[u8] {
        self.raster.as_raw()
    }
}

/// [`ImageCodec`] backed by the `image` crate (decode) and libwebp (encode).
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl ImageCodec for NativeCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, DecodeError> {
        decode::decode_image(bytes)
    }

    fn encode(&self, surface: &Surface, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
        match format {
            OutputFormat::WebP => {
                encode::encode_webp(surface.pixels(), surface.width(), surface.height())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::is_webp;

    fn checker(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let on = (x + y) % 2 == 0;
                pixels.extend_from_slice(if on { &[255, 255, 255, 255] } else { &[0, 0, 0, 128] });
            }
        }
        Bitmap::new(width, height, pixels)
    }

    #[test]
    fn test_media_type() {
        assert_eq!(OutputFormat::WebP.media_type(), "image/webp");
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = Surface::new(3, 2);
        assert_eq!((surface.width(), surface.height()), (3, 2));
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_bitmap_copies_pixels_exactly() {
        let bitmap = checker(5, 4);
        let surface = Surface::from_bitmap(&bitmap);

        assert_eq!((surface.width(), surface.height()), (5, 4));
        assert_eq!(surface.pixels(), bitmap.pixels.as_slice());
    }

    #[test]
    fn test_draw_offset_is_clipped() {
        let mut surface = Surface::new(2, 2);
        let bitmap = Bitmap::new(2, 2, vec![9u8; 16]);
        surface.draw(&bitmap, 1, 1);

        // Only the bottom-right pixel is covered
        assert_eq!(&surface.pixels()[12..16], &[9, 9, 9, 9]);
        assert!(surface.pixels()[0..12].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_native_codec_round_trip() {
        let codec = NativeCodec;
        let bitmap = checker(6, 3);
        let webp = codec
            .encode(&Surface::from_bitmap(&bitmap), OutputFormat::WebP)
            .unwrap();
        assert!(is_webp(&webp));

        let decoded = codec.decode(&webp).unwrap();
        assert_eq!(decoded, bitmap);
    }

    #[test]
    fn test_native_codec_rejects_garbage() {
        assert!(NativeCodec.decode(b"definitely not an image").is_err());
    }

    #[test]
    fn test_native_codec_empty_surface_fails() {
        let result = NativeCodec.encode(&Surface::new(0, 0), OutputFormat::WebP);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }
}
