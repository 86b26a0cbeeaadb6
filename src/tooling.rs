//! Tooling & Integration Layer
//!
//! Command-line front end over the Finder facade.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
