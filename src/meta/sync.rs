//! Entry synchronizer: folds item changes into the parent directory's record.

use crate::concurrency::DirectoryLockManager;
use crate::error::StorageError;
use crate::meta::store::MetadataStore;
use crate::path;
use crate::storage::ItemHandle;
use std::sync::Arc;
use tracing::debug;

/// Single write path for keeping directory records current.
///
/// Every update runs read-merge-write under the parent directory's guard
/// from the store's [`DirectoryLockManager`], so concurrent changes to one
/// directory never lose each other's rows. Share one store (or one lock
/// manager) between every view that writes to the same storage.
pub struct EntrySynchronizer {
    store: Arc<MetadataStore>,
}

impl EntrySynchronizer {
    pub fn new(store: Arc<MetadataStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    pub fn locks(&self) -> &Arc<DirectoryLockManager> {
        self.store.locks()
    }

    /// Reflect the creation or modification of `item` in its parent's record.
    ///
    /// An existing row only has `modifiedAt` bumped; otherwise a new row is
    /// appended with `createdAt = modifiedAt = now`. Items without a parent
    /// reference belong to the root record.
    pub async fn record_change(&self, item: &ItemHandle) -> Result<(), StorageError> {
        validate_name(&item.name)?;
        let parent = path::normalize(item.parent_path())?;

        let _guard = self.locks().acquire(&parent).await;
        let mut record = self.store.load_locked(&parent).await?;
        let added = record.upsert(&item.name, item.kind, self.store.now());
        self.store.write_record(&parent, &record).await?;

        debug!(
            dir = %parent,
            name = %item.name,
            kind = %item.kind,
            added,
            "Recorded entry change"
        );
        Ok(())
    }

    /// Reflect a rename within one directory: `old_name` became `item`.
    ///
    /// The row keeps its `createdAt` and is touched; a row already named like
    /// the target is replaced. Without a row for `old_name` this behaves like
    /// [`EntrySynchronizer::record_change`].
    pub async fn record_rename(
        &self,
        old_name: &str,
        item: &ItemHandle,
    ) -> Result<(), StorageError> {
        validate_name(old_name)?;
        validate_name(&item.name)?;
        let parent = path::normalize(item.parent_path())?;

        let _guard = self.locks().acquire(&parent).await;
        let mut record = self.store.load_locked(&parent).await?;
        let now = self.store.now();
        match record.remove(old_name) {
            Some(mut row) => {
                record.remove(&item.name);
                row.name = item.name.clone();
                row.kind = item.kind;
                row.touch(now);
                record.entries.push(row);
            }
            None => {
                record.upsert(&item.name, item.kind, now);
            }
        }
        self.store.write_record(&parent, &record).await?;

        debug!(dir = %parent, from = %old_name, to = %item.name, "Recorded entry rename");
        Ok(())
    }

    /// Drop the row for `name` from the record of `dir`, if present.
    pub async fn record_removal(&self, dir: &str, name: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        let dir = path::normalize(dir)?;

        let _guard = self.locks().acquire(&dir).await;
        let mut record = self.store.load_locked(&dir).await?;
        if record.remove(name).is_some() {
            self.store.write_record(&dir, &record).await?;
            debug!(dir = %dir, name = %name, "Recorded entry removal");
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(StorageError::InvalidPath(name.to_string()));
    }
    path::ensure_not_reserved(name)
}
