//! Store rooted at a host directory.

use crate::config::sources::root_file::ROOT_CONFIG_FILE;
use crate::error::StorageError;
use crate::path;
use crate::storage::contract::{ChildEntry, Storage};
use crate::types::EntryKind;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Name prefix of in-flight write files. They never show up in listings.
const TEMP_PREFIX: &str = ".finder-tmp-";

/// Disk-backed [`Storage`]. Virtual paths resolve under `root` and never escape it.
///
/// Host-only files are invisible inside the store: the per-store config file
/// at the root and the temporaries of in-flight writes. Every write replaces
/// its target in one rename, so a concurrent reader sees either the old or
/// the new content.
pub struct LocalStorage {
    root: PathBuf,
    temp_counter: AtomicU64,
}

impl LocalStorage {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, virtual_path: &str) -> Result<PathBuf, StorageError> {
        let normalized = path::normalize(virtual_path)?;
        if Self::is_host_only(&normalized) {
            return Err(StorageError::ReservedName(normalized));
        }
        let mut resolved = self.root.clone();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            resolved.push(segment);
        }
        Ok(resolved)
    }

    fn is_host_only(normalized: &str) -> bool {
        normalized == format!("/{}", ROOT_CONFIG_FILE)
            || normalized
                .split('/')
                .any(|segment| segment.starts_with(TEMP_PREFIX))
    }

    fn temp_path_for(&self, target: &Path) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}{}-{}", TEMP_PREFIX, std::process::id(), n);
        target.with_file_name(name)
    }

    fn map_not_found(err: std::io::Error, virtual_path: &str) -> StorageError {
        if err.kind() == ErrorKind::NotFound {
            StorageError::NotFound(virtual_path.to_string())
        } else {
            StorageError::IoError(err)
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let resolved = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&resolved).await?)
    }

    async fn kind_of(&self, path: &str) -> Result<Option<EntryKind>, StorageError> {
        let resolved = self.resolve(path)?;
        match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn list_children(&self, dir: &str) -> Result<Vec<ChildEntry>, StorageError> {
        let resolved = self.resolve(dir)?;
        let normalized = path::normalize(dir)?;
        let meta = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| Self::map_not_found(e, dir))?;
        if !meta.is_dir() {
            return Err(StorageError::NotADirectory(dir.to_string()));
        }

        let mut entries = tokio::fs::read_dir(&resolved).await?;
        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("Skipping non UTF8 entry in {}: {:?}", dir, raw);
                    continue;
                }
            };
            if Self::is_host_only(&path::join(&normalized, &name)) {
                continue;
            }
            let kind = if entry.file_type().await?.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            children.push(ChildEntry { name, kind });
        }
        Ok(children)
    }

    async fn read_text(&self, file: &str) -> Result<String, StorageError> {
        let resolved = self.resolve(file)?;
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| Self::map_not_found(e, file))
    }

    async fn write_text(&self, file: &str, content: &str) -> Result<(), StorageError> {
        let resolved = self.resolve(file)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if tokio::fs::metadata(&resolved)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
        {
            return Err(StorageError::AlreadyExists(file.to_string()));
        }

        let temp = self.temp_path_for(&resolved);
        if let Err(e) = tokio::fs::write(&temp, content).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &resolved).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn create_dir(&self, dir: &str) -> Result<(), StorageError> {
        let resolved = self.resolve(dir)?;
        tokio::fs::create_dir_all(&resolved).await?;
        Ok(())
    }

    async fn size_of(&self, file: &str) -> Result<u64, StorageError> {
        let resolved = self.resolve(file)?;
        let meta = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| Self::map_not_found(e, file))?;
        Ok(if meta.is_dir() { 0 } else { meta.len() })
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if source == self.root || target.starts_with(&source) {
            return Err(StorageError::InvalidPath(format!("{} -> {}", from, to)));
        }
        if tokio::fs::try_exists(&target).await? {
            return Err(StorageError::AlreadyExists(to.to_string()));
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&source, &target)
            .await
            .map_err(|e| Self::map_not_found(e, from))
    }

    async fn remove(&self, target: &str) -> Result<(), StorageError> {
        let resolved = self.resolve(target)?;
        if resolved == self.root {
            return Err(StorageError::InvalidPath(target.to_string()));
        }
        let meta = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| Self::map_not_found(e, target))?;
        if meta.is_dir() {
            tokio::fs::remove_dir_all(&resolved).await?;
        } else {
            tokio::fs::remove_file(&resolved).await?;
        }
        Ok(())
    }
}
