//! CLI Tooling
//!
//! Command-line interface over a disk-backed store. Every mutating command
//! goes through [`Finder`], so directory records stay current.

use crate::clock::SystemClock;
use crate::config::{ConfigLoader, FinderConfig};
use crate::error::ApiError;
use crate::finder::{EntryView, Finder};
use crate::format::{format_file_size, format_timestamp};
use crate::logging::LoggingConfig;
use crate::storage::LocalStorage;
use crate::types::EntryKind;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Finder CLI - browse a sandboxed store with tracked entry timestamps
#[derive(Parser)]
#[command(name = "finder")]
#[command(about = "Browse a sandboxed file store with per-directory metadata records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Host directory backing the store (default: XDG data dir)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List a directory with created/modified times
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create an empty file, or mark an existing entry as modified
    Touch { path: String },
    /// Create a directory and any missing parents
    Mkdir { path: String },
    /// Replace the content of an existing file
    Write { path: String, content: String },
    /// Rename or move an entry
    Mv { from: String, to: String },
    /// Remove a file or directory
    Rm { path: String },
    /// Print the raw metadata record of a directory
    Meta {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Prune stale rows and backfill missing ones for a directory
    Reconcile {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Create the demo files
    Seed,
    /// Print the effective configuration
    Config,
}

pub struct CliContext {
    finder: Finder,
    config: FinderConfig,
    root: PathBuf,
}

impl CliContext {
    /// Load configuration and open the store.
    pub fn new(root: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let mut config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(root.as_deref())?,
        };
        let root = config.storage.resolve_root(root)?;
        config.storage.root = Some(root.clone());

        let storage = LocalStorage::open(&root)?;
        let finder = Finder::new(
            Arc::new(storage),
            Arc::new(SystemClock),
            config.meta.clone(),
        );
        Ok(Self {
            finder,
            config,
            root,
        })
    }

    pub fn finder(&self) -> &Finder {
        &self.finder
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Logging config from the loaded configuration with CLI flags applied on top.
    pub fn logging_config(&self, cli: &Cli) -> LoggingConfig {
        let mut logging = self.config.logging.clone();
        if let Some(level) = &cli.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &cli.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &cli.log_file {
            logging.file = Some(file.clone());
        }
        logging
    }

    /// Execute a command and return its printable output.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = ?command, root = ?self.root, "Executing command");
        match command {
            Commands::Ls { path, format } => {
                let views = self.finder.list(path).await?;
                match format.as_str() {
                    "json" => serde_json::to_string_pretty(&views).map_err(|e| {
                        ApiError::ConfigError(format!("Failed to serialize listing: {}", e))
                    }),
                    "text" => Ok(format_listing_text(&views)),
                    other => Err(ApiError::ConfigError(format!(
                        "Invalid format: {} (must be 'text' or 'json')",
                        other
                    ))),
                }
            }
            Commands::Touch { path } => {
                self.finder.touch(path).await?;
                Ok(format!("Touched {}", path))
            }
            Commands::Mkdir { path } => {
                self.finder.create_dir(path).await?;
                Ok(format!("Created directory {}", path))
            }
            Commands::Write { path, content } => {
                self.finder.write_file(path, content).await?;
                Ok(format!("Wrote {} bytes to {}", content.len(), path))
            }
            Commands::Mv { from, to } => {
                self.finder.rename(from, to).await?;
                Ok(format!("Moved {} -> {}", from, to))
            }
            Commands::Rm { path } => {
                self.finder.remove(path).await?;
                Ok(format!("Removed {}", path))
            }
            Commands::Meta { path } => {
                let record = self.finder.metadata().get_record(path).await?;
                serde_json::to_string_pretty(&record).map_err(|e| {
                    ApiError::ConfigError(format!("Failed to serialize record: {}", e))
                })
            }
            Commands::Reconcile { path } => {
                let record = self.finder.metadata().reconcile(path).await?;
                Ok(format!("Reconciled {}: {} entries", path, record.len()))
            }
            Commands::Seed => {
                let created = self.finder.seed_demo().await?;
                if created.is_empty() {
                    Ok("Demo files already present".to_string())
                } else {
                    Ok(format!("Created {}", created.join(", ")))
                }
            }
            Commands::Config => self.config.to_toml(),
        }
    }
}

fn format_listing_text(views: &[EntryView]) -> String {
    if views.is_empty() {
        return "(empty)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Kind", "Size", "Created", "Modified"]);
    for view in views {
        let name = match view.kind {
            EntryKind::Directory => format!("{}/", view.name),
            EntryKind::File => view.name.clone(),
        };
        let size = view
            .size
            .map(format_file_size)
            .unwrap_or_else(|| "-".to_string());
        let created = view
            .created_at
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        let modified = view
            .modified_at
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![name, view.kind.to_string(), size, created, modified]);
    }
    table.to_string()
}
