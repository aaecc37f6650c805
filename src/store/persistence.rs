//! Sled-backed content store
//!
//! Blocks live in a dedicated `blocks` tree keyed by the 34-byte
//! [`ContentId::to_key_bytes`] form. A batch is checked and written inside
//! one sled transaction, so it lands whole or not at all.

use super::{check_existing, ContentStore};
use crate::error::StorageError;
use crate::types::ContentId;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
};
use std::path::Path;
use tracing::{debug, trace};

const BLOCKS_TREE: &str = "blocks";

pub struct SledContentStore {
    db: sled::Db,
    blocks: sled::Tree,
}

impl SledContentStore {
    /// Open (or create) a store rooted at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let blocks = db.open_tree(BLOCKS_TREE)?;
        Ok(Self { db, blocks })
    }

    /// Temporary store that is removed when dropped.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    /// Every stored id, in key order.
    pub fn ids(&self) -> Result<Vec<ContentId>, StorageError> {
        self.blocks
            .iter()
            .keys()
            .map(|key| -> Result<ContentId, StorageError> {
                Ok(ContentId::from_key_bytes(&key?)?)
            })
            .collect()
    }
}

impl ContentStore for SledContentStore {
    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<(), StorageError> {
        let key = id.to_key_bytes();
        match self
            .blocks
            .compare_and_swap(key, None as Option<&[u8]>, Some(bytes))?
        {
            Ok(()) => {
                trace!(id = %id, size = bytes.len(), "stored block");
                Ok(())
            }
            Err(cas) => match cas.current {
                Some(existing) => check_existing(id, &existing, bytes),
                None => Err(StorageError::Backend(format!(
                    "compare-and-swap on {} failed with no current value",
                    id
                ))),
            },
        }
    }

    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blocks.get(id.to_key_bytes())?.map(|v| v.to_vec()))
    }

    fn has(&self, id: &ContentId) -> Result<bool, StorageError> {
        Ok(self.blocks.contains_key(id.to_key_bytes())?)
    }

    fn put_many(&self, entries: &[(ContentId, Vec<u8>)]) -> Result<(), StorageError> {
        // Reads inside the transaction see its own pending inserts, so a
        // repeated id within the batch is checked like a stored one.
        let written = self
            .blocks
            .transaction(|tx| -> ConflictableTransactionResult<usize, StorageError> {
                let mut written = 0usize;
                for (id, bytes) in entries {
                    let key = id.to_key_bytes();
                    match tx.get(&key[..])? {
                        Some(existing) => check_existing(id, &existing, bytes)
                            .map_err(ConflictableTransactionError::Abort)?,
                        None => {
                            tx.insert(&key[..], bytes.as_slice())?;
                            written += 1;
                        }
                    }
                }
                Ok(written)
            })
            .map_err(|e| match e {
                TransactionError::Abort(err) => err,
                TransactionError::Storage(err) => StorageError::from(err),
            })?;
        self.db.flush()?;
        debug!(blocks = entries.len(), written, "applied block batch");
        Ok(())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.blocks.len())
    }
}
