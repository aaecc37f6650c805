//! CLI Tooling
//!
//! Command-line front end over the import and reader APIs. Every command
//! returns its textual output so it can be tested without a terminal.

use crate::config::{ChunkdagConfig, ConfigLoader, StoreBackend};
use crate::dag::DagReader;
use crate::error::ApiError;
use crate::import::{ImportSummary, Importer};
use crate::logging::LoggingConfig;
use crate::store::{ContentStore, MemoryContentStore, SledContentStore};
use crate::types::{ContentId, HashFunction};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Chunkdag CLI - balanced Merkle DAG importer
#[derive(Parser)]
#[command(name = "chunkdag")]
#[command(about = "Import byte streams into a content-addressed Merkle DAG")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Block store directory (overrides config)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file used when the output includes `file`
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold logging flags over the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Import a file (or `-` for stdin) and print its root id
    Import {
        path: PathBuf,

        /// Bytes per leaf
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Maximum children per internal node
        #[arg(long)]
        max_links: Option<usize>,

        /// Wrap leaves in a File node instead of storing raw bytes
        #[arg(long, default_value = "false")]
        wrapped_leaves: bool,

        /// Hash function (blake3, sha2-256)
        #[arg(long)]
        hash: Option<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write the bytes behind a root id
    Cat {
        cid: String,

        /// Start offset
        #[arg(long)]
        offset: Option<u64>,

        /// Maximum bytes to read from the offset
        #[arg(long)]
        length: Option<u64>,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the shape of a stored DAG
    Stat {
        cid: String,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check every block of a stored DAG
    Verify { cid: String },
}

/// CLI context: loaded configuration plus an open block store
pub struct CliContext {
    config: ChunkdagConfig,
    store: Box<dyn ContentStore>,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(
        workspace_root: &Path,
        config_path: Option<&Path>,
        store_override: Option<&Path>,
    ) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        };

        let store: Box<dyn ContentStore> = match (store_override, config.store.backend) {
            (Some(path), _) => Box::new(SledContentStore::open(path)?),
            (None, StoreBackend::Sled) => {
                let path = config.store.resolve_path(workspace_root)?;
                Box::new(SledContentStore::open(&path)?)
            }
            (None, StoreBackend::Memory) => Box::new(MemoryContentStore::new()),
        };

        Ok(Self { config, store })
    }

    /// Context over an existing store.
    pub fn with_store(config: ChunkdagConfig, store: Box<dyn ContentStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ChunkdagConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Import {
                path,
                chunk_size,
                max_links,
                wrapped_leaves,
                hash,
                format,
            } => {
                let mut config = self.config.import.clone();
                if let Some(size) = chunk_size {
                    config.max_chunk_size = *size;
                }
                if let Some(links) = max_links {
                    config.max_links_per_node = *links;
                }
                if *wrapped_leaves {
                    config.raw_leaves = false;
                }
                if let Some(hash) = hash {
                    config.hash_function = hash.parse::<HashFunction>()?;
                }
                config.validate()?;

                let importer = Importer::new(self.store.as_ref(), config);
                let summary = if path.as_os_str() == "-" {
                    importer.import(std::io::stdin().lock())?
                } else {
                    importer.import_path(path)?
                };
                info!(path = %path.display(), root = %summary.root, "import finished");
                format_import(&summary, format)
            }
            Commands::Cat {
                cid,
                offset,
                length,
                output,
            } => {
                let cid = cid.parse::<ContentId>()?;
                let reader = DagReader::new(self.store.as_ref());
                let range = match (offset, length) {
                    (None, None) => None,
                    (offset, length) => Some((offset.unwrap_or(0), length.unwrap_or(u64::MAX))),
                };
                match output {
                    Some(path) => {
                        let mut file = BufWriter::new(File::create(path)?);
                        let written = copy_out(&reader, &cid, range, &mut file)?;
                        file.flush()?;
                        Ok(format!("Wrote {} bytes to {}", written, path.display()))
                    }
                    None => {
                        let mut stdout = std::io::stdout().lock();
                        copy_out(&reader, &cid, range, &mut stdout)?;
                        stdout.flush()?;
                        Ok(String::new())
                    }
                }
            }
            Commands::Stat { cid, format } => {
                let cid = cid.parse::<ContentId>()?;
                let stat = DagReader::new(self.store.as_ref()).stat(&cid)?;
                match format.as_str() {
                    "json" => Ok(json!({
                        "cid": cid.to_string(),
                        "size": stat.size,
                        "blocks": stat.blocks,
                        "leaves": stat.leaves,
                        "depth": stat.depth,
                        "max_fanout": stat.max_fanout,
                        "stored_bytes": stat.stored_bytes,
                    })
                    .to_string()),
                    "text" => Ok(format!(
                        "CID: {}\nSize: {} bytes\nBlocks: {} ({} leaves)\nDepth: {}\nMax fan-out: {}\nStored: {} bytes",
                        cid,
                        stat.size,
                        stat.blocks,
                        stat.leaves,
                        stat.depth,
                        stat.max_fanout,
                        stat.stored_bytes
                    )),
                    other => Err(ApiError::ConfigError(format!("Unknown format: {}", other))),
                }
            }
            Commands::Verify { cid } => {
                let cid = cid.parse::<ContentId>()?;
                let stat = DagReader::new(self.store.as_ref()).verify(&cid)?;
                Ok(format!(
                    "OK: {} ({} blocks, {} bytes)",
                    cid, stat.blocks, stat.size
                ))
            }
        }
    }
}

/// Write the whole file (streamed leaf by leaf) or one byte range to `out`.
fn copy_out<S: ContentStore + ?Sized, W: Write>(
    reader: &DagReader<'_, S>,
    cid: &ContentId,
    range: Option<(u64, u64)>,
    out: &mut W,
) -> Result<u64, ApiError> {
    match range {
        None => Ok(reader.write_to(cid, out)?),
        Some((offset, length)) => {
            let bytes = reader.read_at(cid, offset, length)?;
            out.write_all(&bytes)?;
            Ok(bytes.len() as u64)
        }
    }
}

fn format_import(summary: &ImportSummary, format: &str) -> Result<String, ApiError> {
    match format {
        "json" => Ok(json!({
            "root": summary.root.to_string(),
            "size": summary.size,
            "leaves": summary.leaves,
            "internal_nodes": summary.internal_nodes,
            "depth": summary.depth,
            "written": summary.commit.written,
            "deduplicated": summary.commit.deduplicated,
        })
        .to_string()),
        "text" => Ok(summary.root.to_string()),
        other => Err(ApiError::ConfigError(format!("Unknown format: {}", other))),
    }
}
