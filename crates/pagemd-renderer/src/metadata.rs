//! Raw block metadata dump for diagnostics mode.

use chrono::{DateTime, Utc};
use pagemd_blocks::BlockRecord;
use serde::Serialize;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f UTC";

/// Dump every raw field of a block.
///
/// Starts with a blank line so the dump stands apart from rendered content.
/// `properties` and `content` are pretty-printed JSON and only listed when
/// present.
#[must_use]
pub fn format_metadata(block: &BlockRecord) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "=== Metadata ===".to_owned(),
        format!("Type: {}", block.block_type),
        format!("ID: {}", block.id),
        format!("Created: {}", timestamp(block.created_at())),
        format!("Last edited: {}", timestamp(block.last_edited_at())),
        format!(
            "Created by: {}",
            block.created_by_name.as_deref().unwrap_or("unknown")
        ),
        format!("Parent ID: {}", block.parent_id.as_deref().unwrap_or("none")),
        format!(
            "Alive: {}",
            block.alive.map_or("unknown", |alive| if alive { "true" } else { "false" })
        ),
    ];

    if let Some(properties) = &block.properties {
        lines.push("Properties:".to_owned());
        lines.push(pretty_json(properties));
    }
    if let Some(content) = &block.content {
        lines.push("Content:".to_owned());
        lines.push(pretty_json(content));
    }

    lines
}

fn timestamp(instant: Option<DateTime<Utc>>) -> String {
    instant.map_or_else(
        || "unknown".to_owned(),
        |at| at.format(TIME_FORMAT).to_string(),
    )
}

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
