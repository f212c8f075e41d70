//! CLI command implementations.

pub(crate) mod page;
pub(crate) mod recent;
pub(crate) mod schema;

use std::path::PathBuf;

use clap::Args;
use pagemd_config::{CliSettings, Config};
use pagemd_storage::SqliteStore;

use crate::error::CliError;

pub(crate) use page::PageArgs;
pub(crate) use recent::RecentArgs;
pub(crate) use schema::SchemaArgs;

/// Store selection flags shared by every command.
#[derive(Args)]
pub(crate) struct StoreArgs {
    /// Path to configuration file (default: auto-discover pagemd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Notion cache database (overrides config).
    #[arg(long, env = "PAGEMD_DB")]
    db: Option<PathBuf>,
}

impl StoreArgs {
    /// Load config, letting `settings` and `--db` override file values.
    pub(crate) fn load_config(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.db_path.clone_from(&self.db);
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Open the configured database read-only.
pub(crate) async fn open_store(config: &Config) -> Result<SqliteStore, CliError> {
    let path = &config.store_resolved.path;
    tracing::info!(path = %path.display(), "Opening block store");
    Ok(SqliteStore::open(path.clone()).await?)
}
