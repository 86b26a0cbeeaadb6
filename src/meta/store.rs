//! Sidecar-backed metadata store.

use crate::clock::Clock;
use crate::concurrency::DirectoryLockManager;
use crate::config::MetaConfig;
use crate::error::StorageError;
use crate::path;
use crate::storage::{ChildEntry, Storage};
use crate::types::{
    DirectoryMetadataRecord, EntryKind, EntryMetadata, Timestamp, SIDECAR_FILE_NAME,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Durable, directory-scoped view of entry timestamps, one sidecar file per directory.
///
/// Every sidecar write this store makes on its own (bootstrap, healing,
/// reconcile) holds the directory's guard from [`MetadataStore::locks`], and
/// re-reads the sidecar once the guard is held. Plain reads of an existing
/// sidecar take no lock.
///
/// Without `cache_records` every read goes back to storage. With it, records
/// are served from memory and refreshed on every [`MetadataStore::write_record`];
/// writes made to the sidecar by anything other than this store are then not
/// observed until [`MetadataStore::invalidate`] is called.
pub struct MetadataStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    config: MetaConfig,
    locks: Arc<DirectoryLockManager>,
    cache: RwLock<HashMap<String, DirectoryMetadataRecord>>,
}

impl MetadataStore {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(storage, clock, MetaConfig::default())
    }

    pub fn with_config(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        config: MetaConfig,
    ) -> Self {
        Self {
            storage,
            clock,
            config,
            locks: Arc::new(DirectoryLockManager::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Serialize against another store over the same storage.
    pub fn with_locks(mut self, locks: Arc<DirectoryLockManager>) -> Self {
        self.locks = locks;
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    pub fn locks(&self) -> &Arc<DirectoryLockManager> {
        &self.locks
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    async fn ensure_directory(&self, dir: &str) -> Result<(), StorageError> {
        match self.storage.kind_of(dir).await? {
            Some(EntryKind::Directory) => Ok(()),
            Some(EntryKind::File) => Err(StorageError::NotADirectory(dir.to_string())),
            None => Err(StorageError::NotFound(dir.to_string())),
        }
    }

    /// Read the sidecar of `dir` without side effects.
    ///
    /// Returns `None` when there is no sidecar yet, or when it is corrupt and
    /// `heal_corrupt` is set.
    pub async fn try_load(
        &self,
        dir: &str,
    ) -> Result<Option<DirectoryMetadataRecord>, StorageError> {
        let dir = path::normalize(dir)?;
        self.ensure_directory(&dir).await?;

        let sidecar = path::sidecar_path(&dir);
        if !self.storage.exists(&sidecar).await? {
            debug!(dir = %dir, "No metadata sidecar");
            return Ok(None);
        }

        let content = self.storage.read_text(&sidecar).await?;
        match serde_json::from_str::<DirectoryMetadataRecord>(&content) {
            Ok(mut record) => {
                record.sanitize();
                debug!(dir = %dir, entries = record.len(), "Loaded metadata sidecar");
                Ok(Some(record))
            }
            Err(e) if self.config.heal_corrupt => {
                warn!(dir = %dir, error = %e, "Metadata sidecar is corrupt");
                Ok(None)
            }
            Err(e) => Err(StorageError::Parse {
                path: sidecar,
                source: e,
            }),
        }
    }

    /// Synthesize a record from a live listing and persist it.
    ///
    /// Every child gets `createdAt = modifiedAt = now`; the sidecar itself is skipped.
    pub async fn bootstrap_from(
        &self,
        dir: &str,
        listing: &[ChildEntry],
    ) -> Result<DirectoryMetadataRecord, StorageError> {
        let dir = path::normalize(dir)?;
        let _guard = self.locks.acquire(&dir).await;
        self.write_bootstrap(&dir, listing).await
    }

    async fn write_bootstrap(
        &self,
        dir: &str,
        listing: &[ChildEntry],
    ) -> Result<DirectoryMetadataRecord, StorageError> {
        let now = self.clock.now();
        let mut record = DirectoryMetadataRecord::new(
            listing
                .iter()
                .filter(|child| child.name != SIDECAR_FILE_NAME)
                .map(|child| EntryMetadata::new(child.name.clone(), child.kind, now))
                .collect(),
        );
        record.sanitize();
        self.write_record(dir, &record).await?;
        info!(dir = %dir, entries = record.len(), "Bootstrapped metadata sidecar");
        Ok(record)
    }

    /// Record for `dir`, bootstrapping it from the live listing if absent.
    ///
    /// Fails with `NotFound` if `dir` does not exist. An existing record is
    /// returned as stored unless `reconcile_on_read` is set.
    pub async fn get_record(&self, dir: &str) -> Result<DirectoryMetadataRecord, StorageError> {
        let dir = path::normalize(dir)?;
        if !self.config.reconcile_on_read {
            if let Some(record) = self.cached(&dir) {
                return Ok(record);
            }
            if let Some(record) = self.try_load(&dir).await? {
                self.remember(&dir, &record);
                return Ok(record);
            }
        }

        let _guard = self.locks.acquire(&dir).await;
        self.load_locked(&dir).await
    }

    /// Same as [`MetadataStore::get_record`] for a caller already holding the
    /// guard of the normalized `dir`.
    pub(crate) async fn load_locked(
        &self,
        dir: &str,
    ) -> Result<DirectoryMetadataRecord, StorageError> {
        if self.config.reconcile_on_read {
            return self.reconcile_locked(dir).await;
        }
        if let Some(record) = self.cached(dir) {
            return Ok(record);
        }

        let record = match self.try_load(dir).await? {
            Some(record) => record,
            None => {
                let listing = self.storage.list_children(dir).await?;
                self.write_bootstrap(dir, &listing).await?
            }
        };
        self.remember(dir, &record);
        Ok(record)
    }

    /// Overwrite the sidecar of `dir` with `record` in a single write.
    ///
    /// Takes no lock. A read-merge-write cycle must hold the directory's guard
    /// for its whole duration or it can lose a concurrent update.
    pub async fn write_record(
        &self,
        dir: &str,
        record: &DirectoryMetadataRecord,
    ) -> Result<(), StorageError> {
        let dir = path::normalize(dir)?;
        let content = serde_json::to_string(record)?;
        self.storage
            .write_text(&path::sidecar_path(&dir), &content)
            .await?;
        self.remember(&dir, record);
        debug!(dir = %dir, entries = record.len(), "Wrote metadata sidecar");
        Ok(())
    }

    /// Bring the record of `dir` in line with the live listing.
    ///
    /// Rows without a live entry are dropped, live entries without a row get
    /// `now` timestamps, and rows whose kind changed are retyped and touched.
    /// Writes only when something changed.
    pub async fn reconcile(&self, dir: &str) -> Result<DirectoryMetadataRecord, StorageError> {
        let dir = path::normalize(dir)?;
        let _guard = self.locks.acquire(&dir).await;
        self.reconcile_locked(&dir).await
    }

    async fn reconcile_locked(&self, dir: &str) -> Result<DirectoryMetadataRecord, StorageError> {
        let listing = self.storage.list_children(dir).await?;
        let mut record = match self.try_load(dir).await? {
            Some(record) => record,
            None => return self.write_bootstrap(dir, &listing).await,
        };

        let live: HashMap<&str, EntryKind> = listing
            .iter()
            .filter(|child| child.name != SIDECAR_FILE_NAME)
            .map(|child| (child.name.as_str(), child.kind))
            .collect();
        let now = self.clock.now();
        let before = record.len();

        record.entries.retain(|entry| live.contains_key(entry.name.as_str()));
        let pruned = before - record.len();

        let mut changed = pruned > 0;
        for entry in record.entries.iter_mut() {
            if let Some(kind) = live.get(entry.name.as_str()) {
                if entry.kind != *kind {
                    entry.kind = *kind;
                    entry.touch(now);
                    changed = true;
                }
            }
        }
        let mut added = 0;
        for child in listing.iter().filter(|c| c.name != SIDECAR_FILE_NAME) {
            if record.get(&child.name).is_none() {
                record
                    .entries
                    .push(EntryMetadata::new(child.name.clone(), child.kind, now));
                added += 1;
            }
        }
        changed |= added > 0;

        if changed {
            self.write_record(dir, &record).await?;
            info!(dir = %dir, pruned, added, "Reconciled metadata sidecar");
        } else {
            self.remember(dir, &record);
        }
        Ok(record)
    }

    fn cached(&self, dir: &str) -> Option<DirectoryMetadataRecord> {
        if !self.config.cache_records {
            return None;
        }
        self.cache.read().get(dir).cloned()
    }

    fn remember(&self, dir: &str, record: &DirectoryMetadataRecord) {
        if self.config.cache_records {
            self.cache.write().insert(dir.to_string(), record.clone());
        }
    }

    /// Drop the cached record of `dir`, if any.
    pub fn invalidate(&self, dir: &str) {
        if let Ok(dir) = path::normalize(dir) {
            self.cache.write().remove(&dir);
        }
    }
}
