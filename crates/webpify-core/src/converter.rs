//! The file-to-WebP conversion pipeline.
//!
//! Validation runs first and short-circuits (media type, then size). After
//! that the file is read, decoded, drawn onto a surface of the same size,
//! encoded and renamed. The encoded output is held to the same size limit as
//! the source. The preview reference is created last, so a failed
//! conversion never leaves a live reference behind.

use serde::Serialize;
use tracing::debug;

use crate::codec::{ImageCodec, NativeCodec, OutputFormat, Surface};
use crate::error::ConvertError;
use crate::naming::webp_file_name;
use crate::reference::ReferenceStore;
use crate::source::SourceFile;
use crate::ConverterConfig;

/// Encoded bytes plus the media type they are tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedBlob {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl EncodedBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A successfully converted file.
///
/// `preview` points at the original bytes, not the WebP output: the user sees
/// what they picked.
#[derive(Debug)]
pub struct ConvertedImage<H> {
    /// WebP output, tagged `image/webp`.
    pub blob: EncodedBlob,
    /// Original name with its last extension replaced by `.webp`.
    pub derived_name: String,
    /// Name as selected by the user.
    pub original_name: String,
    /// Revocable reference to the original bytes.
    pub preview: H,
    /// Size of the encoded output in bytes.
    pub size_bytes: u64,
    /// Declared size of the source file in bytes.
    pub source_size: u64,
}

/// Converts one [`SourceFile`] at a time into a [`ConvertedImage`].
#[derive(Debug, Clone, Default)]
pub struct ImageConverter<C = NativeCodec> {
    codec: C,
    config: ConverterConfig,
}

impl ImageConverter<NativeCodec> {
    /// Converter using [`NativeCodec`].
    pub fn native(config: ConverterConfig) -> Self {
        Self::new(NativeCodec, config)
    }
}

impl<C: ImageCodec> ImageConverter<C> {
    pub fn new(codec: C, config: ConverterConfig) -> Self {
        Self { codec, config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Check media type, then size. Does not touch the file contents.
    pub fn validate<F: SourceFile>(&self, file: &F) -> Result<(), ConvertError> {
        let name = file.name();

        if !file.media_type().starts_with(&self.config.media_type_prefix) {
            return Err(ConvertError::NotAnImage(name.to_string()));
        }

        let size = file.size();
        if size > self.config.max_file_size {
            return Err(ConvertError::TooLarge {
                name: name.to_string(),
                size,
                limit: self.config.max_file_size,
            });
        }

        Ok(())
    }

    /// Run the full pipeline for one file.
    ///
    /// On success the returned image owns one reference from `store`; the
    /// caller is responsible for releasing it.
    pub async fn convert<F, S>(
        &self,
        file: &F,
        store: &mut S,
    ) -> Result<ConvertedImage<S::Handle>, ConvertError>
    where
        F: SourceFile,
        S: ReferenceStore,
    {
        self.validate(file)?;

        let name = file.name();
        let source = file.read().await.map_err(|cause| ConvertError::ReadError {
            name: name.to_string(),
            cause,
        })?;

        let blob = self.transcode(name, &source)?;
        let size_bytes = blob.len() as u64;
        if size_bytes > self.config.max_file_size {
            return Err(ConvertError::TooLarge {
                name: name.to_string(),
                size: size_bytes,
                limit: self.config.max_file_size,
            });
        }
        let derived_name = webp_file_name(name);

        let preview = store
            .create(&source, file.media_type())
            .map_err(|e| ConvertError::PreviewError {
                name: name.to_string(),
                cause: e.to_string(),
            })?;

        debug!(
            "Converted {} -> {} ({} -> {} bytes)",
            name,
            derived_name,
            source.len(),
            blob.len()
        );

        Ok(ConvertedImage {
            size_bytes,
            blob,
            derived_name,
            original_name: name.to_string(),
            preview,
            source_size: file.size(),
        })
    }

    /// Decode, rasterize and re-encode already loaded bytes.
    pub fn transcode(&self, name: &str, source: &[u8]) -> Result<EncodedBlob, ConvertError> {
        let bitmap = self
            .codec
            .decode(source)
            .map_err(|e| ConvertError::DecodeError {
                name: name.to_string(),
                cause: e.to_string(),
            })?;

        let surface = Surface::from_bitmap(&bitmap);
        drop(bitmap);

        let format = OutputFormat::WebP;
        let bytes = self
            .codec
            .encode(&surface, format)
            .map_err(|e| ConvertError::EncodeError {
                name: name.to_string(),
                cause: e.to_string(),
            })?;

        if bytes.is_empty() {
            return Err(ConvertError::EncodeError {
                name: name.to_string(),
                cause: "encoder produced no output".to_string(),
            });
        }

        Ok(EncodedBlob {
            bytes,
            media_type: format.media_type().to_string(),
        })
    }
}
