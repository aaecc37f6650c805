//! Error types
//!
//! Each layer has its own error enum; [`ImportError`] is what the import
//! operation surfaces, [`ApiError`] is what the command-line boundary sees.

use crate::types::{CidParseError, ContentId};
use thiserror::Error;

/// Errors raised by content store backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A different value already exists under this id.
    #[error("Integrity violation: {id} already stored with different bytes")]
    Integrity { id: ContentId },

    #[error("Invalid stored key: {0}")]
    InvalidKey(#[from] CidParseError),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(e) => StorageError::IoError(e),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

/// Errors raised while reading the byte stream into chunks.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("Stream read failed at offset {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Chunking cancelled")]
    Cancelled,
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_chunk_size must be between 1 and {max} bytes, got {value}")]
    ChunkSize { value: usize, max: usize },

    #[error("max_links_per_node must be at least 2, got {0}")]
    MaxLinks(usize),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced by an import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Stream read error: {0}")]
    StreamRead(#[source] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[source] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Integrity error: {id} collides with different stored bytes")]
    Integrity { id: ContentId },

    #[error("Node encoding error: {0}")]
    Encoding(String),

    #[error("Import cancelled")]
    Cancelled,
}

impl From<StorageError> for ImportError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Integrity { id } => ImportError::Integrity { id },
            other => ImportError::Store(other),
        }
    }
}

impl From<bincode::Error> for ImportError {
    fn from(err: bincode::Error) -> Self {
        ImportError::Encoding(err.to_string())
    }
}

impl From<ChunkError> for ImportError {
    fn from(err: ChunkError) -> Self {
        match err {
            ChunkError::Read { source, .. } => ImportError::StreamRead(source),
            ChunkError::Cancelled => ImportError::Cancelled,
        }
    }
}

/// Errors raised while walking a stored DAG.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Block not found: {0}")]
    MissingBlock(ContentId),

    #[error("Block {0} does not hash to its id")]
    Integrity(ContentId),

    #[error("Malformed node {id}: {reason}")]
    Malformed { id: ContentId, reason: String },

    #[error("Offset {offset} is past the end of a {size} byte file")]
    OutOfRange { offset: u64, size: u64 },

    #[error("Store error: {0}")]
    Store(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors at the command-line boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("Invalid content id: {0}")]
    InvalidId(#[from] CidParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
