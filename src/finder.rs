//! Finder facade
//!
//! The operations a file-explorer view performs. Each mutating action runs
//! the storage operation first, then records it through the shared
//! [`EntrySynchronizer`]. A failed recording surfaces as
//! [`ApiError::SyncFailed`] after the storage change has already happened.

use crate::clock::Clock;
use crate::config::MetaConfig;
use crate::error::{ApiError, StorageError};
use crate::meta::{EntrySynchronizer, MetadataStore};
use crate::path;
use crate::storage::{ItemHandle, Storage};
use crate::types::{EntryKind, Timestamp, SIDECAR_FILE_NAME};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Files written by [`Finder::seed_demo`].
pub const DEMO_FILES: [(&str, &str); 2] = [
    ("/Documents/doc1.txt", "test"),
    ("/Downloads/doc2.txt", "test"),
];

/// One row of a directory listing as a view renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub name: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// None when the entry appeared after the record was last written
    pub created_at: Option<Timestamp>,
    pub modified_at: Option<Timestamp>,
}

pub struct Finder {
    storage: Arc<dyn Storage>,
    sync: Arc<EntrySynchronizer>,
}

impl Finder {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, config: MetaConfig) -> Self {
        let store = Arc::new(MetadataStore::with_config(storage.clone(), clock, config));
        Self {
            storage,
            sync: Arc::new(EntrySynchronizer::new(store)),
        }
    }

    /// Another view over the same store, sharing its synchronizer and locks.
    pub fn with_synchronizer(sync: Arc<EntrySynchronizer>) -> Self {
        Self {
            storage: sync.store().storage().clone(),
            sync,
        }
    }

    pub fn synchronizer(&self) -> &Arc<EntrySynchronizer> {
        &self.sync
    }

    pub fn metadata(&self) -> &MetadataStore {
        self.sync.store()
    }

    /// Live children of `dir` with their recorded timestamps; the sidecar is hidden.
    /// Directories come first, then entries by name.
    pub async fn list(&self, dir: &str) -> Result<Vec<EntryView>, ApiError> {
        let dir = path::normalize(dir)?;
        let children = self.storage.list_children(&dir).await?;
        let record = self.metadata().get_record(&dir).await?;

        let children: Vec<_> = children
            .into_iter()
            .filter(|child| child.name != SIDECAR_FILE_NAME)
            .collect();
        let sizes = futures::future::try_join_all(children.iter().map(|child| {
            let child_path = path::join(&dir, &child.name);
            async move {
                match child.kind {
                    EntryKind::File => self.storage.size_of(&child_path).await.map(Some),
                    EntryKind::Directory => Ok(None),
                }
            }
        }))
        .await?;

        let mut views: Vec<EntryView> = children
            .into_iter()
            .zip(sizes)
            .map(|(child, size)| {
                let row = record.get(&child.name);
                EntryView {
                    created_at: row.map(|r| r.created_at),
                    modified_at: row.map(|r| r.modified_at),
                    name: child.name,
                    kind: child.kind,
                    size,
                }
            })
            .collect();
        views.sort_by(|a, b| {
            let rank = |v: &EntryView| matches!(v.kind, EntryKind::File);
            rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
        });
        Ok(views)
    }

    pub async fn create_file(&self, target: &str, content: &str) -> Result<(), ApiError> {
        let target = validate_user_path(target)?;
        if self.storage.exists(&target).await? {
            return Err(StorageError::AlreadyExists(target).into());
        }
        let parent = parent_of(&target)?;
        let missing = self.missing_ancestors(&parent).await?;

        self.storage.write_text(&target, content).await?;
        info!(path = %target, "Created file");

        self.record_created_dirs(&missing).await?;
        self.record(&target, EntryKind::File, "file creation").await
    }

    pub async fn create_dir(&self, target: &str) -> Result<(), ApiError> {
        let target = validate_user_path(target)?;
        if self.storage.exists(&target).await? {
            return Err(StorageError::AlreadyExists(target).into());
        }
        let missing = self.missing_ancestors(&target).await?;

        self.storage.create_dir(&target).await?;
        info!(path = %target, "Created directory");

        // `missing` ends with `target` itself
        self.record_created_dirs(&missing).await
    }

    /// Replace the content of an existing file.
    pub async fn write_file(&self, target: &str, content: &str) -> Result<(), ApiError> {
        let target = validate_user_path(target)?;
        match self.storage.kind_of(&target).await? {
            Some(EntryKind::File) => {}
            Some(EntryKind::Directory) => {
                return Err(StorageError::InvalidPath(format!("{} is a directory", target)).into())
            }
            None => return Err(StorageError::NotFound(target).into()),
        }

        self.storage.write_text(&target, content).await?;
        info!(path = %target, bytes = content.len(), "Wrote file");
        self.record(&target, EntryKind::File, "file modification").await
    }

    /// Create an empty file, or mark an existing entry as modified.
    pub async fn touch(&self, target: &str) -> Result<(), ApiError> {
        let target = validate_user_path(target)?;
        match self.storage.kind_of(&target).await? {
            Some(kind) => self.record(&target, kind, "modification").await,
            None => self.create_file(&target, "").await,
        }
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<(), ApiError> {
        let from = validate_user_path(from)?;
        let to = validate_user_path(to)?;
        let kind = self
            .storage
            .kind_of(&from)
            .await?
            .ok_or_else(|| StorageError::NotFound(from.clone()))?;
        let (from_parent, from_name) = split_owned(&from)?;
        let (to_parent, _) = split_owned(&to)?;
        let missing = self.missing_ancestors(&to_parent).await?;

        self.storage.rename(&from, &to).await?;
        info!(from = %from, to = %to, "Renamed entry");

        let item = ItemHandle::from_path(&to, kind)?;
        if from_parent == to_parent {
            self.sync
                .record_rename(&from_name, &item)
                .await
                .map_err(|source| sync_failed("rename", &to, source))
        } else {
            self.sync
                .record_removal(&from_parent, &from_name)
                .await
                .map_err(|source| sync_failed("move", &from, source))?;
            self.record_created_dirs(&missing).await?;
            self.sync
                .record_change(&item)
                .await
                .map_err(|source| sync_failed("move", &to, source))
        }
    }

    /// Remove a file, or a directory and everything below it.
    pub async fn remove(&self, target: &str) -> Result<(), ApiError> {
        let target = validate_user_path(target)?;
        let (parent, name) = split_owned(&target)?;

        self.storage.remove(&target).await?;
        info!(path = %target, "Removed entry");

        self.sync
            .record_removal(&parent, &name)
            .await
            .map_err(|source| sync_failed("removal", &target, source))
    }

    /// Write the demo files a fresh store starts with, skipping any that exist.
    /// Returns the paths that were created.
    pub async fn seed_demo(&self) -> Result<Vec<String>, ApiError> {
        let mut created = Vec::new();
        for (file, content) in DEMO_FILES {
            if !self.storage.exists(file).await? {
                self.create_file(file, content).await?;
                created.push(file.to_string());
            }
        }
        Ok(created)
    }

    async fn record(
        &self,
        target: &str,
        kind: EntryKind,
        action: &'static str,
    ) -> Result<(), ApiError> {
        let item = ItemHandle::from_path(target, kind)?;
        self.sync
            .record_change(&item)
            .await
            .map_err(|source| sync_failed(action, target, source))
    }

    /// Directories on the way to `dir` (inclusive) that do not exist yet, outermost first.
    async fn missing_ancestors(&self, dir: &str) -> Result<Vec<String>, ApiError> {
        let mut missing = Vec::new();
        let mut current = path::ROOT.to_string();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            current = path::join(&current, segment);
            match self.storage.kind_of(&current).await? {
                Some(EntryKind::Directory) => {}
                Some(EntryKind::File) => {
                    return Err(StorageError::NotADirectory(current).into());
                }
                None => missing.push(current.clone()),
            }
        }
        Ok(missing)
    }

    async fn record_created_dirs(&self, dirs: &[String]) -> Result<(), ApiError> {
        for dir in dirs {
            self.record(dir, EntryKind::Directory, "directory creation")
                .await?;
        }
        Ok(())
    }
}

/// Normalize a user-supplied path and reject any segment that would shadow a sidecar.
fn validate_user_path(raw: &str) -> Result<String, StorageError> {
    let normalized = path::normalize(raw)?;
    for segment in normalized.split('/').filter(|s| !s.is_empty()) {
        path::ensure_not_reserved(segment)?;
    }
    Ok(normalized)
}

fn parent_of(target: &str) -> Result<String, StorageError> {
    split_owned(target).map(|(parent, _)| parent)
}

fn split_owned(target: &str) -> Result<(String, String), StorageError> {
    path::split(target)
        .map(|(parent, name)| (parent.to_string(), name.to_string()))
        .ok_or_else(|| StorageError::InvalidPath(target.to_string()))
}

fn sync_failed(action: &'static str, target: &str, source: StorageError) -> ApiError {
    ApiError::SyncFailed {
        action,
        path: target.to_string(),
        source,
    }
}
