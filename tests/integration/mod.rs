//! Integration tests for the directory metadata overlay

mod cli_local_store;
mod metadata_overlay;
mod support;
