//! Buffered DAG writer
//!
//! Nodes are staged in memory as they are sealed and only reach the
//! content store on [`BufferedDag::commit`], as one atomic batch in staging
//! order. Staging order is children-before-parents because a parent can only
//! be sealed once its children's ids are known.

use super::node::SealedNode;
use crate::error::ImportError;
use crate::store::{check_existing, ContentStore};
use crate::types::ContentId;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Distinct nodes held in the staging buffer.
    pub staged: usize,
    /// Nodes written to the store.
    pub written: usize,
    /// Staged nodes the store already held.
    pub deduplicated: usize,
    pub bytes_written: u64,
}

/// Staging buffer in front of a content store
///
/// Owned by a single import. Dropping it without committing discards every
/// staged node with no store I/O.
pub struct BufferedDag<'s, S: ContentStore + ?Sized> {
    store: &'s S,
    pending: Vec<(ContentId, Vec<u8>)>,
    index: HashSet<ContentId>,
}

impl<'s, S: ContentStore + ?Sized> BufferedDag<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            pending: Vec::new(),
            index: HashSet::new(),
        }
    }

    /// Hold `node` until commit. No I/O.
    pub fn stage(&mut self, node: &SealedNode) -> ContentId {
        if self.index.insert(node.cid) {
            self.pending.push((node.cid, node.bytes.clone()));
        }
        node.cid
    }

    pub fn is_staged(&self, id: &ContentId) -> bool {
        self.index.contains(id)
    }

    pub fn staged_len(&self) -> usize {
        self.pending.len()
    }

    /// Staged bytes for `id`, if present.
    pub fn get_staged(&self, id: &ContentId) -> Option<&[u8]> {
        if !self.index.contains(id) {
            return None;
        }
        self.pending
            .iter()
            .find(|(cid, _)| cid == id)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Persist every staged node.
    ///
    /// Nodes the store already holds are compared byte for byte; a
    /// mismatch fails the commit with `ImportError::Integrity` before
    /// anything is written. On error nothing written by this call should be
    /// treated as durable; the staging buffer is left intact so the caller
    /// can drop it.
    pub fn commit(&mut self, cancel: &CancellationToken) -> Result<CommitStats, ImportError> {
        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        let staged = self.pending.len();
        let mut batch = Vec::with_capacity(staged);
        for (id, bytes) in &self.pending {
            match self.store.get(id)? {
                Some(existing) => check_existing(id, &existing, bytes)?,
                None => batch.push((*id, bytes.clone())),
            }
        }

        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        let bytes_written = batch.iter().map(|(_, b)| b.len() as u64).sum();
        if !batch.is_empty() {
            self.store.put_many(&batch)?;
        }

        let stats = CommitStats {
            staged,
            written: batch.len(),
            deduplicated: staged - batch.len(),
            bytes_written,
        };
        debug!(
            staged = stats.staged,
            written = stats.written,
            deduplicated = stats.deduplicated,
            bytes = stats.bytes_written,
            "committed staged nodes"
        );

        self.pending.clear();
        self.index.clear();
        Ok(stats)
    }

    /// Drop every staged node.
    pub fn discard(&mut self) {
        self.pending.clear();
        self.index.clear();
    }
}
