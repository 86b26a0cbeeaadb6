//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::FinderConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from files and environment.
    ///
    /// `store_root` is the host directory backing the store, if already known;
    /// a `finder.toml` inside it is layered over the global file.
    pub fn load(store_root: Option<&Path>) -> Result<FinderConfig, ConfigError> {
        MergeService::load(store_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<FinderConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> FinderConfig {
        FinderConfig::default()
    }
}
