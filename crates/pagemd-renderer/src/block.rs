//! Per-block Markdown rendering.
//!
//! Rendering is depth-agnostic: lines come back without indentation and the
//! assembler prefixes them according to nesting.

use pagemd_blocks::{BlockRecord, BlockType};

use crate::metadata::format_metadata;
use crate::options::RenderOptions;
use crate::rich_text::{resolve, resolve_value};

/// Resolve a block's `title` property, if it has one.
#[must_use]
pub fn resolve_title(block: &BlockRecord) -> Option<String> {
    block.title().map(|title| resolve(&title))
}

/// Render one block's own content.
///
/// `title` is the block's already-resolved title. Title-bearing types only
/// produce output when it holds non-whitespace text. Returns `None` when the
/// block produced nothing.
#[must_use]
pub fn render_lines(
    block: &BlockRecord,
    title: Option<&str>,
    options: &RenderOptions,
) -> Option<Vec<String>> {
    let lines = match &block.block_type {
        BlockType::Divider => vec!["---".to_owned()],
        BlockType::Table => table_listing(block, options),
        BlockType::TableRow => table_row(block).into_iter().collect(),
        BlockType::Image => image(block).into_iter().collect(),
        block_type => title
            .filter(|text| !text.trim().is_empty())
            .map(|text| titled(block_type, text))
            .unwrap_or_default(),
    };

    (!lines.is_empty()).then_some(lines)
}

/// Render one block in isolation, metadata included in diagnostics mode.
///
/// Output is unindented. Returns `None` only when the block produced nothing
/// and diagnostics are off.
#[must_use]
pub fn render_block(block: &BlockRecord, options: &RenderOptions) -> Option<String> {
    let title = resolve_title(block);
    let mut lines = render_lines(block, title.as_deref(), options);

    if options.diagnostics {
        lines
            .get_or_insert_with(Vec::new)
            .extend(format_metadata(block));
    }

    lines.map(|lines| lines.join("\n"))
}

fn titled(block_type: &BlockType, text: &str) -> Vec<String> {
    if let Some(level) = block_type.heading_level() {
        return vec![format!("{} {text}", "#".repeat(usize::from(level)))];
    }

    let line = match block_type {
        BlockType::BulletedList | BlockType::BulletedListItem => format!("- {text}"),
        BlockType::NumberedList | BlockType::NumberedListItem => format!("1. {text}"),
        BlockType::ToDo => format!("- [ ] {text}"),
        BlockType::Toggle | BlockType::Quote => format!("> {text}"),
        BlockType::Callout => format!("💡 {text}"),
        BlockType::Code => return vec!["```".to_owned(), text.to_owned(), "```".to_owned()],
        _ => text.to_owned(),
    };
    vec![line]
}

fn table_listing(block: &BlockRecord, options: &RenderOptions) -> Vec<String> {
    let rows = match &block.content {
        Some(rows) if !rows.is_empty() && options.lists_table_rows() => rows,
        _ => return Vec::new(),
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(String::new());
    lines.push("Table:".to_owned());
    lines.extend(rows.iter().map(|id| format!("- {id}")));
    lines
}

fn table_row(block: &BlockRecord) -> Option<String> {
    let cells: Vec<String> = block
        .properties
        .as_ref()?
        .values()
        .map(|value| resolve_value(Some(value)))
        .filter(|cell| !cell.is_empty())
        .collect();

    if cells.is_empty() {
        return None;
    }
    Some(format!("| {} |", cells.join(" | ")))
}

fn image(block: &BlockRecord) -> Option<String> {
    let source = block.rich_text("source")?;
    let source = source.first_fragment()?;

    let title = block.title();
    let title = title
        .as_ref()
        .and_then(|t| t.first_fragment())
        .unwrap_or("image");

    Some(format!("![{title}]({source})"))
}
