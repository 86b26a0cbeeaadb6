//! Per-directory serialization of metadata updates
//!
//! Every read-merge-write cycle against a directory's sidecar runs while
//! holding that directory's lock. Directories never block each other.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard held for the duration of one update cycle. Dropping it releases the directory.
pub type DirectoryGuard = OwnedMutexGuard<()>;

/// Per-directory lock manager keyed by normalized directory path.
#[derive(Default)]
pub struct DirectoryLockManager {
    /// Map from directory path to its async mutex.
    /// Uses Arc<Mutex<()>> so a guard can outlive the map borrow.
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl DirectoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for a directory
    fn get_lock(&self, dir: &str) -> Arc<Mutex<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(dir) {
                return lock.clone();
            }
        }

        let mut map = self.locks.write();
        // Another task may have inserted it between the two map locks
        map.entry(dir.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire exclusive access to `dir`, waiting for any in-flight update to finish.
    pub async fn acquire(&self, dir: &str) -> DirectoryGuard {
        let lock = self.get_lock(dir);
        lock.lock_owned().await
    }

    /// Number of directories that have been locked at least once.
    pub fn tracked(&self) -> usize {
        self.locks.read().len()
    }
}
