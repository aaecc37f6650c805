//! Base builder for every config load.

use crate::import::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LINKS};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the defaults later sources override.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("import.max_chunk_size", DEFAULT_CHUNK_SIZE as i64)?
        .set_default("import.max_links_per_node", DEFAULT_MAX_LINKS as i64)?
        .set_default("import.raw_leaves", true)?
        .set_default("import.hash_function", "blake3")?
        .set_default("store.backend", "sled")
}
