//! Webpify WASM - WebAssembly bindings for the webpify upload widget
//!
//! This crate exposes the webpify-core conversion pipeline to JavaScript and
//! provides the browser side of its platform traits (file reads, object
//! URLs, downloads, alerts).
//!
//! # Module Structure
//!
//! - `uploader` - `WebpUploader`, the widget state and its actions
//! - `convert` - Stand-alone conversion and naming functions
//! - `browser` - `File`, object-URL and download implementations
//! - `logging` - `tracing` subscriber writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { WebpUploader } from '@webpify/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const uploader = new WebpUploader();
//! const added = await uploader.addFiles(input.files);
//! console.log(`${added} images ready: ${uploader.uploadLabel()}`);
//! ```

use wasm_bindgen::prelude::*;

mod browser;
mod convert;
mod logging;
mod uploader;

// Re-export public types
pub use browser::{AnchorDownload, BrowserFile, ObjectUrl, ObjectUrlStore};
pub use convert::{convert_to_webp, webp_file_name};
pub use uploader::WebpUploader;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::init_logging();
}

/// Switch console logging to debug level (per-file conversion details).
#[wasm_bindgen(js_name = enableDebugLogging)]
pub fn enable_debug_logging() {
    logging::set_debug(true);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
