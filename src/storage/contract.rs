//! Storage capability the overlay sits on.

use crate::error::StorageError;
use crate::path;
use crate::types::EntryKind;
use async_trait::async_trait;

/// One immediate child of a directory as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Sandboxed hierarchical byte store.
///
/// All paths are virtual, absolute and normalized (see [`crate::path`]).
/// Every method may suspend.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Kind of the entry at `path`, `None` if absent.
    async fn kind_of(&self, path: &str) -> Result<Option<EntryKind>, StorageError>;

    /// Immediate children of `dir`. Fails with `NotFound` if `dir` does not exist.
    async fn list_children(&self, dir: &str) -> Result<Vec<ChildEntry>, StorageError>;

    async fn read_text(&self, file: &str) -> Result<String, StorageError>;

    /// Create or overwrite `file`, creating missing parent directories.
    async fn write_text(&self, file: &str, content: &str) -> Result<(), StorageError>;

    /// Create `dir` and any missing parents. Succeeds if it already exists.
    async fn create_dir(&self, dir: &str) -> Result<(), StorageError>;

    async fn size_of(&self, file: &str) -> Result<u64, StorageError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Remove a file, or a directory with everything under it.
    async fn remove(&self, path: &str) -> Result<(), StorageError>;
}

/// Parent reference carried by an item handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub path: String,
}

/// Handle to a file or directory that was just created or modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemHandle {
    pub name: String,
    pub kind: EntryKind,
    pub parent: Option<ParentRef>,
}

impl ItemHandle {
    pub fn new(name: impl Into<String>, kind: EntryKind, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: parent.map(|p| ParentRef {
                path: p.to_string(),
            }),
        }
    }

    /// Build a handle from a full virtual path. The root has no handle.
    pub fn from_path(full_path: &str, kind: EntryKind) -> Result<Self, StorageError> {
        let normalized = path::normalize(full_path)?;
        let (parent, name) = path::split(&normalized)
            .ok_or_else(|| StorageError::InvalidPath(full_path.to_string()))?;
        Ok(Self::new(name, kind, Some(parent)))
    }

    /// Parent directory path; items without a parent reference live at the root.
    pub fn parent_path(&self) -> &str {
        self.parent
            .as_ref()
            .map(|p| p.path.as_str())
            .unwrap_or(path::ROOT)
    }
}
