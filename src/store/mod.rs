//! Content Store
//!
//! Persistent mapping from content identifier to serialized block bytes.
//! Writes are append-only and idempotent: storing identical bytes under an
//! existing id is a no-op, storing different bytes under it is rejected.

pub mod memory;
pub mod persistence;

pub use memory::MemoryContentStore;
pub use persistence::SledContentStore;

use crate::error::StorageError;
use crate::types::ContentId;

/// Content-addressed block store interface
///
/// Implementations must tolerate concurrent puts of the same id from
/// independent imports without external locking.
pub trait ContentStore: Send + Sync {
    /// Store `bytes` under `id`.
    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<(), StorageError>;

    /// Fetch the exact bytes stored under `id`.
    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StorageError>;

    fn has(&self, id: &ContentId) -> Result<bool, StorageError>;

    /// Store every entry or none of them.
    ///
    /// All entries are checked for collisions before anything is written.
    fn put_many(&self, entries: &[(ContentId, Vec<u8>)]) -> Result<(), StorageError>;

    /// Number of stored blocks.
    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl<S: ContentStore + ?Sized> ContentStore for std::sync::Arc<S> {
    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).put(id, bytes)
    }

    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(id)
    }

    fn has(&self, id: &ContentId) -> Result<bool, StorageError> {
        (**self).has(id)
    }

    fn put_many(&self, entries: &[(ContentId, Vec<u8>)]) -> Result<(), StorageError> {
        (**self).put_many(entries)
    }

    fn len(&self) -> Result<usize, StorageError> {
        (**self).len()
    }
}

/// Compare an existing value against an incoming one for the same id.
pub(crate) fn check_existing(
    id: &ContentId,
    existing: &[u8],
    incoming: &[u8],
) -> Result<(), StorageError> {
    if existing == incoming {
        Ok(())
    } else {
        tracing::warn!(id = %id, "rejecting write of different bytes under existing id");
        Err(StorageError::Integrity { id: *id })
    }
}
