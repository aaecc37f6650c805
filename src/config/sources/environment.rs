//! Environment variable source: CHUNKDAG_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `CHUNKDAG_IMPORT__MAX_CHUNK_SIZE=4096` sets `import.max_chunk_size`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("CHUNKDAG")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
