//! Virtual path handling for the sandboxed store.
//!
//! Every path inside the store is absolute, `/`-separated and normalized:
//! no empty segments, no `.`, and `..` resolved lexically. `..` above the
//! root is rejected rather than clamped.

use crate::error::StorageError;
use crate::types::SIDECAR_FILE_NAME;

pub const ROOT: &str = "/";

/// Normalize a virtual path. Relative paths are taken relative to the root.
pub fn normalize(path: &str) -> Result<String, StorageError> {
    if path.contains('\0') || path.contains('\\') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(StorageError::InvalidPath(path.to_string()));
                }
            }
            other => segments.push(other),
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Join a child name onto a normalized directory path.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT || dir.is_empty() {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

/// Split a normalized path into its parent directory and final name.
/// Returns `None` for the root.
pub fn split(path: &str) -> Option<(&str, &str)> {
    if path == ROOT {
        return None;
    }
    let index = path.rfind('/')?;
    let parent = if index == 0 { ROOT } else { &path[..index] };
    Some((parent, &path[index + 1..]))
}

pub fn parent(path: &str) -> Option<&str> {
    split(path).map(|(parent, _)| parent)
}

pub fn file_name(path: &str) -> Option<&str> {
    split(path).map(|(_, name)| name)
}

/// Reject user-created entries that would shadow the sidecar file.
pub fn ensure_not_reserved(name: &str) -> Result<(), StorageError> {
    if name == SIDECAR_FILE_NAME {
        return Err(StorageError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// Path of the sidecar file for a directory.
pub fn sidecar_path(dir: &str) -> String {
    join(dir, SIDECAR_FILE_NAME)
}
