//! Per-store config file: <store root>/finder.toml (optional).
//!
//! The file sits in the host directory but is not part of the store: local
//! storage never lists it and refuses to touch it.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

pub const ROOT_CONFIG_FILE: &str = "finder.toml";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    store_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(File::from(store_root.join(ROOT_CONFIG_FILE)).required(false)))
}
