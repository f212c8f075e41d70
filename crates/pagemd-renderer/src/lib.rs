//! Markdown rendering for flat block hierarchies.
//!
//! A page arrives as a flat list of [`BlockRecord`](pagemd_blocks::BlockRecord)s.
//! This crate rebuilds the hierarchy and renders it to Markdown.
//!
//! # Architecture
//!
//! - [`resolve`]: inline rich text to Markdown (`**bold**`, `[links](url)`)
//! - [`render_lines`] / [`render_block`]: one block to zero or more lines,
//!   dispatched on the block type
//! - [`format_metadata`]: raw field dump appended in diagnostics mode
//! - [`Assembler`]: child lookup, traversal and indentation
//!
//! # Example
//!
//! ```
//! use pagemd_blocks::BlockRecord;
//! use pagemd_renderer::{RenderOptions, render_page};
//!
//! let blocks = vec![
//!     BlockRecord::new("p", "page").with_content(["h", "t"]),
//!     BlockRecord::new("h", "heading1").with_title("Intro"),
//!     BlockRecord::new("t", "text").with_title("Hello"),
//! ];
//!
//! let markdown = render_page(&blocks[0], &blocks, RenderOptions::default());
//! assert_eq!(markdown, "# Intro\nHello");
//! ```

mod assembler;
mod block;
mod metadata;
mod options;
mod rich_text;

pub use assembler::{Assembler, INDENT, Traversal, render_page, render_page_by_id};
pub use block::{render_block, render_lines, resolve_title};
pub use metadata::format_metadata;
pub use options::{RenderOptions, TableListing};
pub use rich_text::{resolve, resolve_value};
