//! Block record and rich text types for pagemd.
//!
//! A page is stored as a flat list of [`BlockRecord`]s that reference their
//! children by id. This crate only models those records; hierarchy
//! reconstruction and Markdown output live in `pagemd-renderer`.

mod block_type;
mod record;
mod rich_text;

pub use block_type::BlockType;
pub use record::{BlockRecord, Properties};
pub use rich_text::{Format, RichText, Segment};
