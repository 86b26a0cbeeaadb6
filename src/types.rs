//! Core types for the directory metadata overlay.

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Reserved, dot-prefixed name of the sidecar file kept in every tracked directory.
pub const SIDECAR_FILE_NAME: &str = ".finder-meta";

/// Kind of a storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a directory's metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub name: String,
    pub kind: EntryKind,
    pub modified_at: Timestamp,
    pub created_at: Timestamp,
}

impl EntryMetadata {
    /// A freshly tracked entry: created and modified at the same instant.
    pub fn new(name: impl Into<String>, kind: EntryKind, now: Timestamp) -> Self {
        Self {
            name: name.into(),
            kind,
            modified_at: now,
            created_at: now,
        }
    }

    /// Mark the entry as modified. Never moves `modified_at` before `created_at`.
    pub fn touch(&mut self, now: Timestamp) {
        self.modified_at = now.max(self.created_at);
    }
}

/// Sidecar content for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMetadataRecord {
    pub entries: Vec<EntryMetadata>,
}

impl DirectoryMetadataRecord {
    pub fn new(entries: Vec<EntryMetadata>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&EntryMetadata> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut EntryMetadata> {
        self.entries.iter_mut().find(|entry| entry.name == name)
    }

    /// Touch the row named `name`, or append a new one. Returns true if a row was added.
    ///
    /// A touched row takes the given `kind`, so an item replaced by one of the
    /// other kind is retyped in place.
    pub fn upsert(&mut self, name: &str, kind: EntryKind, now: Timestamp) -> bool {
        match self.get_mut(name) {
            Some(existing) => {
                existing.kind = kind;
                existing.touch(now);
                false
            }
            None => {
                self.entries.push(EntryMetadata::new(name, kind, now));
                true
            }
        }
    }

    /// Remove the row named `name`, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<EntryMetadata> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop rows the record must never carry: the sidecar itself and duplicate names.
    /// The first row for a name wins.
    pub(crate) fn sanitize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .retain(|entry| entry.name != SIDECAR_FILE_NAME && seen.insert(entry.name.clone()));
    }
}
