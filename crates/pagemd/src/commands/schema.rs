//! `pagemd schema` command implementation.

use clap::Args;
use pagemd_config::CliSettings;
use pagemd_storage::{BlockStore, ColumnInfo, TableSchema};

use super::{StoreArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Sample values longer than this are cut short.
const MAX_VALUE_CHARS: usize = 50;

/// Arguments for the schema command.
#[derive(Args)]
pub(crate) struct SchemaArgs {
    #[command(flatten)]
    store: StoreArgs,
}

impl SchemaArgs {
    /// Execute the schema command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the store cannot be read.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.store.load_config(CliSettings::default())?;
        let store = open_store(&config).await?;

        let tables = store.schema().await?;
        output.highlight(&format!(
            "{} tables in {}",
            tables.len(),
            config.store_resolved.path.display()
        ));

        let sections: Vec<String> = tables
            .iter()
            .map(|table| format_table(table).join("\n"))
            .collect();
        output.document(&sections.join("\n\n"))?;
        Ok(())
    }
}

/// Describe one table: columns, indexes, foreign keys and sample rows.
pub(crate) fn format_table(table: &TableSchema) -> Vec<String> {
    let mut lines = vec![format!("Table: {}", table.name)];

    lines.push("  Columns:".to_owned());
    lines.extend(table.columns.iter().map(|c| format!("    {}", format_column(c))));

    if !table.indexes.is_empty() {
        lines.push("  Indexes:".to_owned());
        lines.extend(table.indexes.iter().map(|index| {
            if index.unique {
                format!("    {} (unique)", index.name)
            } else {
                format!("    {}", index.name)
            }
        }));
    }

    if !table.foreign_keys.is_empty() {
        lines.push("  Foreign keys:".to_owned());
        lines.extend(table.foreign_keys.iter().map(|fk| match &fk.to {
            Some(to) => format!("    {} -> {}.{to}", fk.from, fk.table),
            None => format!("    {} -> {}", fk.from, fk.table),
        }));
    }

    if !table.sample_rows.is_empty() {
        lines.push("  Sample rows:".to_owned());
        lines.extend(table.sample_rows.iter().map(|row| {
            let fields: Vec<String> = table
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| {
                    let value = value.as_deref().map_or_else(|| "NULL".to_owned(), truncate);
                    format!("{}={value}", column.name)
                })
                .collect();
            format!("    {}", fields.join(", "))
        }));
    }

    lines
}

fn format_column(column: &ColumnInfo) -> String {
    let mut parts = vec![column.name.clone()];
    if !column.data_type.is_empty() {
        parts.push(column.data_type.clone());
    }
    if column.primary_key {
        parts.push("PRIMARY KEY".to_owned());
    }
    if column.not_null {
        parts.push("NOT NULL".to_owned());
    }
    if let Some(default) = &column.default_value {
        parts.push(format!("DEFAULT {default}"));
    }
    parts.join(" ")
}

/// Cut values over the limit to leave room for an ellipsis.
fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_VALUE_CHARS {
        let head: String = value.chars().take(MAX_VALUE_CHARS - 3).collect();
        format!("{head}...")
    } else {
        value.to_owned()
    }
}
