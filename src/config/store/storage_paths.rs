//! StorageConfig and root resolution for the backing store.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Host directory backing the store; None means the XDG data default
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the host directory, with precedence: CLI, config, XDG default.
    pub fn resolve_root(&self, cli_root: Option<PathBuf>) -> Result<PathBuf, ApiError> {
        if let Some(root) = cli_root {
            if !root.as_os_str().is_empty() {
                return Ok(root);
            }
        }
        if let Some(root) = &self.root {
            if !root.as_os_str().is_empty() {
                return Ok(root.clone());
            }
        }
        xdg::default_store_root()
    }
}
