//! Files handed to the converter.

use std::future::{self, Future};

/// A user-selected file.
///
/// Name, media type and size are known up front (the browser fills them in
/// from the file picker), so validation never has to read the contents.
/// Reading is asynchronous and may fail.
pub trait SourceFile {
    /// File name as shown to the user.
    fn name(&self) -> &str;

    /// Declared media type, e.g. `image/jpeg`. May be empty.
    fn media_type(&self) -> &str;

    /// Declared size in bytes.
    fn size(&self) -> u64;

    /// Load the whole file into memory. The error is a human-readable cause.
    fn read(&self) -> impl Future<Output = Result<Vec<u8>, String>>;
}

/// A [`SourceFile`] whose bytes are already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

impl SourceFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read(&self) -> impl Future<Output = Result<Vec<u8>, String>> {
        future::ready(Ok(self.bytes.clone()))
    }
}
