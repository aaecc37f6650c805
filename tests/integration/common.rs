//! Shared fixtures for integration tests

use chunkdag::error::StorageError;
use chunkdag::{ContentId, ContentStore, MemoryContentStore};
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

pub const MIB: usize = 1 << 20;

/// Deterministic non-repeating test payload.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// How a [`FlakyStore`] misbehaves on batch writes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BatchFailure {
    /// Reject the batch before writing anything.
    Reject,
    /// Write the first half of the batch, then fail.
    Torn,
}

/// Memory store whose batch writes fail while `failing` is set.
pub struct FlakyStore {
    pub inner: MemoryContentStore,
    pub failing: AtomicBool,
    pub mode: BatchFailure,
    pub batches: AtomicUsize,
}

impl FlakyStore {
    pub fn new(mode: BatchFailure) -> Self {
        Self {
            inner: MemoryContentStore::new(),
            failing: AtomicBool::new(true),
            mode,
            batches: AtomicUsize::new(0),
        }
    }

    pub fn heal(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

impl ContentStore for FlakyStore {
    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<(), StorageError> {
        self.inner.put(id, bytes)
    }

    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(id)
    }

    fn has(&self, id: &ContentId) -> Result<bool, StorageError> {
        self.inner.has(id)
    }

    fn put_many(&self, entries: &[(ContentId, Vec<u8>)]) -> Result<(), StorageError> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        if !self.failing.load(Ordering::SeqCst) {
            return self.inner.put_many(entries);
        }
        if self.mode == BatchFailure::Torn {
            for (id, bytes) in &entries[..entries.len() / 2] {
                self.inner.put(id, bytes)?;
            }
        }
        Err(StorageError::Backend("simulated write failure".to_string()))
    }

    fn len(&self) -> Result<usize, StorageError> {
        self.inner.len()
    }
}

/// Reader that cancels `token` once `after` bytes have been served.
pub struct CancellingReader {
    data: Vec<u8>,
    pos: usize,
    after: usize,
    token: CancellationToken,
}

impl CancellingReader {
    pub fn new(data: Vec<u8>, after: usize, token: CancellationToken) -> Self {
        Self {
            data,
            pos: 0,
            after,
            token,
        }
    }
}

impl Read for CancellingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos).min(64);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        if self.pos >= self.after {
            self.token.cancel();
        }
        Ok(n)
    }
}

/// Reader that fails once `ok_bytes` have been served.
pub struct BrokenReader {
    pub ok_bytes: usize,
    pub served: usize,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.served >= self.ok_bytes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "peer reset upload",
            ));
        }
        let n = buf.len().min(self.ok_bytes - self.served);
        buf[..n].fill(0xEE);
        self.served += n;
        Ok(n)
    }
}
