//! Chunkdag: Balanced Merkle DAG Importer
//!
//! Splits a byte stream into fixed-size chunks, arranges the chunks into a
//! balanced Merkle DAG with bounded fan-out, and commits every node to a
//! content-addressed block store. The root [`ContentId`] names the whole
//! stream.
//!
//! ```no_run
//! use chunkdag::{import, ImportConfig, MemoryContentStore};
//!
//! let store = MemoryContentStore::new();
//! let root = import(&b"hello"[..], &store, &ImportConfig::default())?;
//! println!("{}", root);
//! # Ok::<(), chunkdag::error::ImportError>(())
//! ```

pub mod chunker;
pub mod config;
pub mod dag;
pub mod error;
pub mod import;
pub mod logging;
pub mod store;
pub mod tooling;
pub mod types;

pub use error::{ImportError, ReadError, StorageError};
pub use import::{import, ImportConfig, ImportSummary, Importer};
pub use store::{ContentStore, MemoryContentStore, SledContentStore};
pub use types::{Codec, ContentId, HashFunction};
