//! `pagemd recent` command implementation.

use chrono::{DateTime, Utc};
use clap::Args;
use pagemd_config::CliSettings;
use pagemd_storage::{BlockStore, RecentEntry};

use super::{StoreArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Arguments for the recent command.
#[derive(Args)]
pub(crate) struct RecentArgs {
    /// Number of entries to list (overrides config).
    #[arg(short = 'n', long)]
    limit: Option<u32>,

    #[command(flatten)]
    store: StoreArgs,
}

impl RecentArgs {
    /// Execute the recent command.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit is zero, configuration fails, or the
    /// store cannot be read.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if self.limit == Some(0) {
            return Err(CliError::Validation(
                "--limit must be greater than 0".to_owned(),
            ));
        }

        let config = self.store.load_config(CliSettings::default())?;
        let limit = self.limit.unwrap_or(config.recent.limit);
        let store = open_store(&config).await?;

        let entries = store.recent_entries(limit).await?;
        output.highlight(&format!("{} recently edited blocks", entries.len()));

        let lines: Vec<String> = entries.iter().map(format_entry).collect();
        output.document(&lines.join("\n"))?;
        Ok(())
    }
}

fn timestamp(instant: Option<DateTime<Utc>>) -> String {
    instant.map_or_else(|| "unknown".to_owned(), |at| at.format(TIME_FORMAT).to_string())
}

/// One listing line: edit time, type, id, title, position, creator and
/// creation time.
pub(crate) fn format_entry(entry: &RecentEntry) -> String {
    let block = &entry.block;
    let edited = timestamp(block.last_edited_at());
    let title = block
        .title()
        .map(|title| title.plain_text())
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| "(untitled)".to_owned());

    let mut line = format!(
        "{edited}  {:<16} {}  {title}",
        block.block_type.as_str(),
        block.id
    );
    if let Some(root) = &entry.root_page_id {
        line.push_str(&format!("  [root {root}"));
        if let Some(level) = entry.level {
            line.push_str(&format!(", level {level}"));
        }
        line.push(']');
    }
    line.push_str(&format!(
        "  by {}, created {}",
        block.created_by_name.as_deref().unwrap_or("unknown"),
        timestamp(block.created_at())
    ));
    line
}
