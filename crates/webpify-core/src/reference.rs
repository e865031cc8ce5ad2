//! Revocable references to in-memory blobs.
//!
//! Previews and downloads both need a short-lived handle to a blob (an
//! object URL in the browser). A handle is created by a [`ReferenceStore`]
//! and handed back to it exactly once through [`ReferenceStore::release`],
//! which takes the handle by value.

use std::collections::HashMap;

use thiserror::Error;

/// Failure to create a reference.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// The platform refused to create the reference.
    #[error("Could not create reference: {0}")]
    CreateFailed(String),
}

/// Creates and releases revocable blob references.
pub trait ReferenceStore {
    /// Handle given out for each live reference.
    type Handle;

    /// Create a reference to a copy of `bytes` tagged with `media_type`.
    fn create(&mut self, bytes: &[u8], media_type: &str) -> Result<Self::Handle, ReferenceError>;

    /// Revoke a reference. Consumes the handle so it cannot be released twice.
    fn release(&mut self, handle: Self::Handle);
}

/// Handle issued by [`MemoryReferenceStore`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ReferenceId(u64);

impl ReferenceId {
    /// Numeric id, stable for the lifetime of the reference.
    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct StoredBlob {
    bytes: Vec<u8>,
    media_type: String,
}

/// In-process [`ReferenceStore`] that keeps every live blob in a map.
///
/// `live_count` makes leaked references observable.
#[derive(Debug, Default)]
pub struct MemoryReferenceStore {
    next_id: u64,
    live: HashMap<u64, StoredBlob>,
    created: u64,
    released: u64,
}

impl MemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of references created and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total references ever created.
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Total references released.
    pub fn released_count(&self) -> u64 {
        self.released
    }

    /// Look up the bytes behind a live reference.
    pub fn resolve(&self, handle: &ReferenceId) -> Option<(&[u8], &str)> {
        self.live
            .get(&handle.0)
            .map(|blob| (blob.bytes.as_slice(), blob.media_type.as_str()))
    }
}

impl ReferenceStore for MemoryReferenceStore {
    type Handle = ReferenceId;

    fn create(&mut self, bytes: &[u8], media_type: &str) -> Result<ReferenceId, ReferenceError> {
        let id = self.next_id;
        self.next_id += 1;
        self.created += 1;
        self.live.insert(
            id,
            StoredBlob {
                bytes: bytes.to_vec(),
                media_type: media_type.to_string(),
            },
        );
        Ok(ReferenceId(id))
    }

    fn release(&mut self, handle: ReferenceId) {
        if self.live.remove(&handle.0).is_some() {
            self.released += 1;
        } else {
            tracing::warn!("Release of unknown reference {}", handle.0);
        }
    }
}
