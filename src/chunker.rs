//! Fixed-size chunker
//!
//! Splits a byte stream into consecutive chunks of exactly `max_chunk_size`
//! bytes; only the last chunk may be shorter. Empty input yields no chunks.
//! Chunks are produced lazily, one read-to-fill at a time.

use crate::error::{ChunkError, ConfigError};
use std::io::{ErrorKind, Read};
use tokio_util::sync::CancellationToken;

/// A contiguous slice of the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset within the original stream.
    pub offset: u64,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Splits a reader into fixed-size chunks.
pub struct SizeSplitter<R> {
    reader: R,
    chunk_size: usize,
    offset: u64,
    done: bool,
    cancel: Option<CancellationToken>,
}

impl<R: Read> SizeSplitter<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::ChunkSize {
                value: 0,
                max: crate::import::MAX_CHUNK_SIZE,
            });
        }
        Ok(Self {
            reader,
            chunk_size,
            offset: 0,
            done: false,
            cancel: None,
        })
    }

    /// Check `token` before every read.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next chunk, `None` once the stream is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, ChunkError> {
        if self.done {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;

        while filled < self.chunk_size {
            if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                self.done = true;
                return Err(ChunkError::Cancelled);
            }
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    // The partial chunk is dropped with `buf`.
                    self.done = true;
                    return Err(ChunkError::Read {
                        offset: self.offset + filled as u64,
                        source,
                    });
                }
            }
        }

        if filled < self.chunk_size {
            self.done = true;
        }
        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        let chunk = Chunk {
            offset: self.offset,
            data: buf,
        };
        self.offset += filled as u64;
        Ok(Some(chunk))
    }
}

impl<R: Read> Iterator for SizeSplitter<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

impl<R: Read> std::iter::FusedIterator for SizeSplitter<R> {}
