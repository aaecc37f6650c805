//! Configuration
//!
//! Layered configuration for imports, the block store, and logging. Sources
//! are merged by [`merge::service::MergeService`] and exposed through
//! [`ConfigLoader`].

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod store;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use store::{StoreBackend, StoreConfig};

use crate::import::ImportConfig;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkdagConfig {
    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
