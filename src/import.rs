//! Import: byte stream in, root content identifier out.
//!
//! An import owns its staging buffer for its whole lifetime. Nothing reaches
//! the content store until the layout has produced a root, and then every
//! staged node is written in one atomic batch. A failed or cancelled import
//! leaves the store with, at most, blocks that were already there.

use crate::chunker::SizeSplitter;
use crate::dag::{balanced_layout, CommitStats, DagBuilder, LeafBuilder};
use crate::error::{ConfigError, ImportError};
use crate::store::ContentStore;
use crate::types::{ContentId, HashFunction};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span};

/// Default bytes per leaf (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Default maximum children per internal node
pub const DEFAULT_MAX_LINKS: usize = 1024;

/// Largest accepted leaf size (64 MiB)
pub const MAX_CHUNK_SIZE: usize = 64 << 20;

/// Import configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Bytes per leaf
    #[serde(default = "default_chunk_size")]
    pub max_chunk_size: usize,

    /// Maximum children per internal node
    #[serde(default = "default_max_links")]
    pub max_links_per_node: usize,

    /// Store leaves as raw bytes instead of wrapped `File` nodes
    #[serde(default = "default_true")]
    pub raw_leaves: bool,

    #[serde(default)]
    pub hash_function: HashFunction,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_links() -> usize {
    DEFAULT_MAX_LINKS
}

fn default_true() -> bool {
    true
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_chunk_size(),
            max_links_per_node: default_max_links(),
            raw_leaves: default_true(),
            hash_function: HashFunction::default(),
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk_size == 0 || self.max_chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::ChunkSize {
                value: self.max_chunk_size,
                max: MAX_CHUNK_SIZE,
            });
        }
        if self.max_links_per_node < 2 {
            return Err(ConfigError::MaxLinks(self.max_links_per_node));
        }
        Ok(())
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    pub fn with_max_links(mut self, links: usize) -> Self {
        self.max_links_per_node = links;
        self
    }

    pub fn with_raw_leaves(mut self, raw: bool) -> Self {
        self.raw_leaves = raw;
        self
    }

    pub fn with_hash_function(mut self, hash: HashFunction) -> Self {
        self.hash_function = hash;
        self
    }
}

/// What an import produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub root: ContentId,
    /// Logical bytes imported.
    pub size: u64,
    pub leaves: u64,
    pub internal_nodes: u64,
    pub depth: usize,
    pub commit: CommitStats,
}

/// Import `reader` into `store` and return the root identifier.
pub fn import<R: Read, S: ContentStore + ?Sized>(
    reader: R,
    store: &S,
    config: &ImportConfig,
) -> Result<ContentId, ImportError> {
    Importer::new(store, config.clone())
        .import(reader)
        .map(|summary| summary.root)
}

/// Runs imports against one store with one configuration.
pub struct Importer<'s, S: ContentStore + ?Sized> {
    store: &'s S,
    config: ImportConfig,
    cancel: CancellationToken,
}

impl<'s, S: ContentStore + ?Sized> Importer<'s, S> {
    pub fn new(store: &'s S, config: ImportConfig) -> Self {
        Self {
            store,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Observe `token` at every stream read and before the commit.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn import<R: Read>(&self, reader: R) -> Result<ImportSummary, ImportError> {
        self.config.validate()?;

        let span = info_span!(
            "import",
            chunk_size = self.config.max_chunk_size,
            max_links = self.config.max_links_per_node,
            raw_leaves = self.config.raw_leaves,
            hash = self.config.hash_function.name(),
        );
        let _guard = span.enter();
        let started = Instant::now();

        let splitter = SizeSplitter::new(reader, self.config.max_chunk_size)?
            .with_cancellation(self.cancel.clone());
        let leaves = LeafBuilder::new(self.config.raw_leaves, self.config.hash_function);
        let mut builder = DagBuilder::new(splitter, leaves, self.store);

        let layout = balanced_layout(&mut builder, self.config.max_links_per_node)?;
        let size = builder.bytes_read();
        let mut staged = builder.into_buffer();
        let commit = staged.commit(&self.cancel)?;

        let summary = ImportSummary {
            root: layout.root.cid,
            size,
            leaves: layout.leaves,
            internal_nodes: layout.internal_nodes,
            depth: layout.depth,
            commit,
        };
        info!(
            root = %summary.root,
            size = summary.size,
            leaves = summary.leaves,
            internal_nodes = summary.internal_nodes,
            depth = summary.depth,
            written = summary.commit.written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "import committed"
        );
        Ok(summary)
    }

    /// Import the file at `path`.
    pub fn import_path(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let file = std::fs::File::open(path).map_err(ImportError::StreamRead)?;
        self.import(std::io::BufReader::new(file))
    }
}
