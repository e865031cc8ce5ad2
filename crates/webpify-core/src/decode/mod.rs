//! Image decoding for the conversion pipeline.
//!
//! This module provides functionality for:
//! - Sniffing the real format of uploaded bytes
//! - Decoding JPEG, PNG, GIF, BMP and WebP sources to an RGBA [`Bitmap`]
//!
//! # Architecture
//!
//! Decoding is synchronous. In the browser it runs on the UI thread between
//! the `FileReader` await and the object-URL calls, so no state is shared.
//!
//! # Examples
//!
//! ```ignore
//! use webpify_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let bitmap = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", bitmap.width, bitmap.height);
//! ```

mod sniff;
mod types;

pub use sniff::decode_image;
pub use types::{Bitmap, DecodeError, BYTES_PER_PIXEL};
