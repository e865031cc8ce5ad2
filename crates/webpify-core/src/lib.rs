//! Webpify Core - client-side image to WebP conversion
//!
//! This crate provides the conversion pipeline behind the webpify upload
//! widget: validation, decoding, rasterizing, WebP encoding and renaming of
//! user-selected images, plus the controller that keeps the list of
//! converted files and hands them off for upload.
//!
//! Platform services (decoder/encoder, revocable blob references, file
//! reads, downloads) sit behind traits so the same pipeline runs natively
//! and in the browser.

pub mod codec;
pub mod controller;
pub mod converter;
pub mod decode;
pub mod display;
pub mod encode;
pub mod error;
pub mod list;
pub mod naming;
pub mod reference;
pub mod source;

pub use codec::{ImageCodec, NativeCodec, OutputFormat, Surface};
pub use controller::{
    BatchReport, Download, DownloadSink, UploadController, UploadItem, UploadPayload,
    UploadReport,
};
pub use converter::{ConvertedImage, EncodedBlob, ImageConverter};
pub use error::{ConvertError, Notice};
pub use list::ImageList;
pub use naming::webp_file_name;
pub use reference::{MemoryReferenceStore, ReferenceError, ReferenceId, ReferenceStore};
pub use source::{MemoryFile, SourceFile};

/// Default upper bound on a source file's declared size (5 MiB).
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Media type prefix a file must carry to be accepted.
pub const IMAGE_MEDIA_PREFIX: &str = "image";

/// Converter settings
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Largest accepted source size in bytes
    pub max_file_size: u64,
    /// Case-sensitive prefix the declared media type must start with
    pub media_type_prefix: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            media_type_prefix: IMAGE_MEDIA_PREFIX.to_string(),
        }
    }
}

impl ConverterConfig {
    /// Create a new ConverterConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
