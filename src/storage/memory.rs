//! In-process store backed by an ordered map.
//!
//! Each operation yields to the runtime before touching the map so that
//! concurrent callers interleave the way they would against real I/O.

use crate::error::StorageError;
use crate::path;
use crate::storage::contract::{ChildEntry, Storage};
use crate::types::EntryKind;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Node {
    File(String),
    Directory,
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self {
            Node::File(_) => EntryKind::File,
            Node::Directory => EntryKind::Directory,
        }
    }
}

/// Memory-backed [`Storage`]. The root directory always exists.
pub struct MemoryStorage {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(path::ROOT.to_string(), Node::Directory);
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Create every missing directory on the way to `dir`. Nothing is inserted
    /// unless the whole chain is valid.
    fn ensure_dirs(nodes: &mut BTreeMap<String, Node>, dir: &str) -> Result<(), StorageError> {
        let mut current = path::ROOT.to_string();
        let mut missing = Vec::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            current = path::join(&current, segment);
            match nodes.get(&current) {
                Some(Node::Directory) => {}
                Some(Node::File(_)) => return Err(StorageError::NotADirectory(current)),
                None => missing.push(current.clone()),
            }
        }
        for dir in missing {
            nodes.insert(dir, Node::Directory);
        }
        Ok(())
    }

    fn is_under(candidate: &str, dir: &str) -> bool {
        candidate == dir || candidate.starts_with(&format!("{}/", dir.trim_end_matches('/')))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        tokio::task::yield_now().await;
        Ok(self.nodes.read().contains_key(path))
    }

    async fn kind_of(&self, path: &str) -> Result<Option<EntryKind>, StorageError> {
        tokio::task::yield_now().await;
        Ok(self.nodes.read().get(path).map(Node::kind))
    }

    async fn list_children(&self, dir: &str) -> Result<Vec<ChildEntry>, StorageError> {
        tokio::task::yield_now().await;
        let nodes = self.nodes.read();
        match nodes.get(dir) {
            Some(Node::Directory) => {}
            Some(Node::File(_)) => return Err(StorageError::NotADirectory(dir.to_string())),
            None => return Err(StorageError::NotFound(dir.to_string())),
        }
        let children = nodes
            .iter()
            .filter(|(candidate, _)| path::parent(candidate) == Some(dir))
            .filter_map(|(candidate, node)| {
                path::file_name(candidate).map(|name| ChildEntry {
                    name: name.to_string(),
                    kind: node.kind(),
                })
            })
            .collect();
        Ok(children)
    }

    async fn read_text(&self, file: &str) -> Result<String, StorageError> {
        tokio::task::yield_now().await;
        match self.nodes.read().get(file) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(Node::Directory) => Err(StorageError::InvalidPath(format!(
                "{} is a directory",
                file
            ))),
            None => Err(StorageError::NotFound(file.to_string())),
        }
    }

    async fn write_text(&self, file: &str, content: &str) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        let (parent, _) =
            path::split(file).ok_or_else(|| StorageError::InvalidPath(file.to_string()))?;
        let mut nodes = self.nodes.write();
        Self::ensure_dirs(&mut nodes, parent)?;
        if let Some(Node::Directory) = nodes.get(file) {
            return Err(StorageError::AlreadyExists(file.to_string()));
        }
        nodes.insert(file.to_string(), Node::File(content.to_string()));
        Ok(())
    }

    async fn create_dir(&self, dir: &str) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        let mut nodes = self.nodes.write();
        Self::ensure_dirs(&mut nodes, dir)
    }

    async fn size_of(&self, file: &str) -> Result<u64, StorageError> {
        tokio::task::yield_now().await;
        match self.nodes.read().get(file) {
            Some(Node::File(content)) => Ok(content.len() as u64),
            Some(Node::Directory) => Ok(0),
            None => Err(StorageError::NotFound(file.to_string())),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        if from == path::ROOT || Self::is_under(to, from) {
            return Err(StorageError::InvalidPath(format!("{} -> {}", from, to)));
        }
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(from) {
            return Err(StorageError::NotFound(from.to_string()));
        }
        if nodes.contains_key(to) {
            return Err(StorageError::AlreadyExists(to.to_string()));
        }
        let (to_parent, _) =
            path::split(to).ok_or_else(|| StorageError::InvalidPath(to.to_string()))?;
        Self::ensure_dirs(&mut nodes, to_parent)?;

        let moved: Vec<String> = nodes
            .keys()
            .filter(|candidate| Self::is_under(candidate, from))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                let new = format!("{}{}", to, &old[from.len()..]);
                nodes.insert(new, node);
            }
        }
        Ok(())
    }

    async fn remove(&self, target: &str) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        if target == path::ROOT {
            return Err(StorageError::InvalidPath(target.to_string()));
        }
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(target) {
            return Err(StorageError::NotFound(target.to_string()));
        }
        nodes.retain(|candidate, _| !Self::is_under(candidate, target));
        Ok(())
    }
}
