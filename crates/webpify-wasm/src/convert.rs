//! Stand-alone conversion bindings.
//!
//! These expose the webpify-core pipeline without the widget state, for
//! pages that manage their own file list.
//!
//! # Functions
//!
//! - [`convert_to_webp`] - Decode any supported image and re-encode it as WebP
//! - [`webp_file_name`] - Derive the `.webp` output name for a file
//!
//! # Example
//!
//! ```typescript
//! import { convert_to_webp, webpFileName } from '@webpify/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const webp = convert_to_webp(bytes);
//! const out = new File([webp], webpFileName(file.name), { type: 'image/webp' });
//! ```

use wasm_bindgen::prelude::*;
use webpify_core::{naming, ConverterConfig, ImageConverter};

/// Decode image bytes (JPEG, PNG, GIF, BMP or WebP) and encode them as WebP.
///
/// No size or media-type validation is done here; callers that need it
/// should go through `WebpUploader`.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded or the encoder fails.
#[wasm_bindgen]
pub fn convert_to_webp(bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    ImageConverter::native(ConverterConfig::default())
        .transcode("input", bytes)
        .map(|blob| blob.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Replace the last extension of `name` with `.webp`, or append it.
#[wasm_bindgen(js_name = webpFileName)]
pub fn webp_file_name(name: &str) -> String {
    naming::webp_file_name(name)
}
