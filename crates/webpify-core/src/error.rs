//! Per-file conversion failures and the notices shown for them.

use std::fmt;

use thiserror::Error;

/// Why a single file was left out of the image list.
///
/// Every variant is scoped to one file; none of them stops a batch.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Declared media type does not start with the required prefix.
    #[error("{0} is not an image")]
    NotAnImage(String),

    /// Declared size is above the configured limit.
    #[error("{name} is {size} bytes, over the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    /// The file contents could not be loaded.
    #[error("Could not read {name}: {cause}")]
    ReadError { name: String, cause: String },

    /// The contents are not a decodable image.
    #[error("Could not decode {name}: {cause}")]
    DecodeError { name: String, cause: String },

    /// The encoder failed or produced no output.
    #[error("Could not encode {name} as WebP: {cause}")]
    EncodeError { name: String, cause: String },

    /// The preview reference could not be created.
    #[error("Could not create preview for {name}: {cause}")]
    PreviewError { name: String, cause: String },
}

impl ConvertError {
    /// Name of the file that failed.
    pub fn file_name(&self) -> &str {
        match self {
            ConvertError::NotAnImage(name) => name,
            ConvertError::TooLarge { name, .. }
            | ConvertError::ReadError { name, .. }
            | ConvertError::DecodeError { name, .. }
            | ConvertError::EncodeError { name, .. }
            | ConvertError::PreviewError { name, .. } => name,
        }
    }

    /// The user-facing notice for this failure.
    pub fn notice(&self) -> Notice {
        let file_name = self.file_name().to_string();
        match self {
            ConvertError::NotAnImage(_) => Notice::NotAnImage { file_name },
            ConvertError::TooLarge { limit, .. } => Notice::TooLarge {
                file_name,
                limit_bytes: *limit,
            },
            _ => Notice::ProcessingFailed { file_name },
        }
    }
}

/// One user-visible message per failing file.
///
/// Only three categories reach the user; read, decode, encode and preview
/// failures all surface as [`Notice::ProcessingFailed`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NotAnImage { file_name: String },
    TooLarge { file_name: String, limit_bytes: u64 },
    ProcessingFailed { file_name: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NotAnImage { file_name } => write!(f, "File {file_name} is not an image."),
            Notice::TooLarge {
                file_name,
                limit_bytes,
            } => write!(
                f,
                "File {file_name} is larger than {}MB.",
                limit_bytes / (1024 * 1024)
            ),
            Notice::ProcessingFailed { file_name } => write!(f, "Error processing {file_name}"),
        }
    }
}
