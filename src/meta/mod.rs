//! Directory metadata overlay
//!
//! Each tracked directory carries a hidden sidecar file with per-entry
//! creation and modification timestamps. [`MetadataStore`] loads, bootstraps
//! and writes those records; [`EntrySynchronizer`] folds item changes into
//! them one directory at a time.

pub mod store;
pub mod sync;

pub use store::MetadataStore;
pub use sync::EntrySynchronizer;
