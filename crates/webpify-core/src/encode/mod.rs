//! Image encoding for the conversion pipeline.
//!
//! This module provides functionality for:
//! - Encoding RGBA rasters to WebP at the encoder's default setting
//!
//! # Examples
//!
//! ```ignore
//! use webpify_core::encode::encode_webp;
//!
//! let pixels = vec![128u8; 100 * 100 * 4]; // Gray, opaque-ish image
//! let webp_bytes = encode_webp(&pixels, 100, 100).unwrap();
//! println!("Encoded {} bytes", webp_bytes.len());
//! ```

mod webp;

pub use webp::{encode_webp, is_webp, EncodeError, WEBP_MAX_DIMENSION};
