//! In-memory content store.

use super::{check_existing, ContentStore};
use crate::error::StorageError;
use crate::types::ContentId;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

/// Content store backed by a `RwLock<HashMap>`.
///
/// Used by tests and by imports that only need the root identifier.
#[derive(Default)]
pub struct MemoryContentStore {
    blocks: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a block without any checks.
    #[cfg(test)]
    pub(crate) fn corrupt(&self, id: &ContentId, bytes: Vec<u8>) {
        self.blocks.write().insert(*id, bytes);
    }

    /// Remove a block without any checks.
    #[cfg(test)]
    pub(crate) fn remove(&self, id: &ContentId) {
        self.blocks.write().remove(id);
    }

    pub fn ids(&self) -> Vec<ContentId> {
        self.blocks.read().keys().copied().collect()
    }
}

impl ContentStore for MemoryContentStore {
    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<(), StorageError> {
        let mut blocks = self.blocks.write();
        if let Some(existing) = blocks.get(id) {
            return check_existing(id, existing, bytes);
        }
        trace!(id = %id, size = bytes.len(), "storing block in memory");
        blocks.insert(*id, bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blocks.read().get(id).cloned())
    }

    fn has(&self, id: &ContentId) -> Result<bool, StorageError> {
        Ok(self.blocks.read().contains_key(id))
    }

    fn put_many(&self, entries: &[(ContentId, Vec<u8>)]) -> Result<(), StorageError> {
        let mut blocks = self.blocks.write();
        let mut incoming: HashMap<&ContentId, &[u8]> = HashMap::with_capacity(entries.len());
        for (id, bytes) in entries {
            if let Some(existing) = blocks.get(id) {
                check_existing(id, existing, bytes)?;
            }
            if let Some(earlier) = incoming.insert(id, bytes.as_slice()) {
                check_existing(id, earlier, bytes)?;
            }
        }
        for (id, bytes) in incoming {
            blocks.entry(*id).or_insert_with(|| bytes.to_vec());
        }
        Ok(())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.blocks.read().len())
    }
}
