//! Configuration
//!
//! Layered configuration for the Finder shell: built-in defaults, an optional
//! global file, an optional `finder.toml` inside the storage root, and
//! `FINDER_*` environment variables (highest precedence).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod store;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use store::storage_paths::StorageConfig;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Behavior of the directory metadata overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Serve repeat reads from an in-process cache updated on every write.
    #[serde(default)]
    pub cache_records: bool,

    /// Rebuild a sidecar that no longer parses instead of failing.
    #[serde(default = "default_true")]
    pub heal_corrupt: bool,

    /// Prune and backfill rows against the live listing on every read.
    #[serde(default)]
    pub reconcile_on_read: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            cache_records: false,
            heal_corrupt: true,
            reconcile_on_read: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinderConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub meta: MetaConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FinderConfig {
    /// Render the configuration as TOML, e.g. for `finder config`.
    pub fn to_toml(&self) -> Result<String, crate::error::ApiError> {
        toml::to_string_pretty(self).map_err(|e| {
            crate::error::ApiError::ConfigError(format!("Failed to serialize config: {}", e))
        })
    }
}
