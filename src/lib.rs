//! Finder: directory metadata overlay for a sandboxed file-explorer shell
//!
//! Tracks per-entry creation and modification times in a hidden sidecar file
//! inside every directory of a hierarchical store, and keeps those records
//! consistent while several views create, modify, rename and remove entries.

pub mod clock;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod finder;
pub mod format;
pub mod logging;
pub mod meta;
pub mod path;
pub mod storage;
pub mod tooling;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ApiError, StorageError};
pub use finder::{EntryView, Finder};
pub use meta::{EntrySynchronizer, MetadataStore};
pub use storage::{ItemHandle, LocalStorage, MemoryStorage, Storage};
pub use types::{DirectoryMetadataRecord, EntryKind, EntryMetadata, Timestamp, SIDECAR_FILE_NAME};
