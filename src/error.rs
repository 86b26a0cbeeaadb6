//! Error types for the metadata overlay and the Finder facade.

use thiserror::Error;

/// Failures raised by the storage capability and the metadata store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("'{0}' is reserved for directory metadata")]
    ReservedName(String),

    #[error("failed to parse metadata record at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize metadata record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced to callers of the Finder facade and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("could not record {action} of {path}: {source}")]
    SyncFailed {
        action: &'static str,
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
