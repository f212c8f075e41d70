//! Block type tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag of a block record.
///
/// The store has used two naming schemes over time (`header` vs `heading1`,
/// `bulleted_list` vs `bulleted_list_item`, ...). Each stored tag gets its own
/// variant so the exact tag survives a round trip; the renderer groups the
/// aliases when it matches. Tags this crate does not know about land in
/// [`BlockType::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Page,
    Text,
    Paragraph,
    Header,
    SubHeader,
    SubSubHeader,
    Heading1,
    Heading2,
    Heading3,
    BulletedList,
    BulletedListItem,
    NumberedList,
    NumberedListItem,
    ToDo,
    Toggle,
    Quote,
    Callout,
    Code,
    Divider,
    Table,
    TableRow,
    Image,
    /// Unrecognized tag, kept verbatim.
    Other(String),
}

impl BlockType {
    /// Parse a stored type tag. Never fails.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "page" => Self::Page,
            "text" => Self::Text,
            "paragraph" => Self::Paragraph,
            "header" => Self::Header,
            "sub_header" => Self::SubHeader,
            "sub_sub_header" => Self::SubSubHeader,
            "heading1" => Self::Heading1,
            "heading2" => Self::Heading2,
            "heading3" => Self::Heading3,
            "bulleted_list" => Self::BulletedList,
            "bulleted_list_item" => Self::BulletedListItem,
            "numbered_list" => Self::NumberedList,
            "numbered_list_item" => Self::NumberedListItem,
            "to_do" => Self::ToDo,
            "toggle" => Self::Toggle,
            "quote" => Self::Quote,
            "callout" => Self::Callout,
            "code" => Self::Code,
            "divider" => Self::Divider,
            "table" => Self::Table,
            "table_row" => Self::TableRow,
            "image" => Self::Image,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The tag as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Page => "page",
            Self::Text => "text",
            Self::Paragraph => "paragraph",
            Self::Header => "header",
            Self::SubHeader => "sub_header",
            Self::SubSubHeader => "sub_sub_header",
            Self::Heading1 => "heading1",
            Self::Heading2 => "heading2",
            Self::Heading3 => "heading3",
            Self::BulletedList => "bulleted_list",
            Self::BulletedListItem => "bulleted_list_item",
            Self::NumberedList => "numbered_list",
            Self::NumberedListItem => "numbered_list_item",
            Self::ToDo => "to_do",
            Self::Toggle => "toggle",
            Self::Quote => "quote",
            Self::Callout => "callout",
            Self::Code => "code",
            Self::Divider => "divider",
            Self::Table => "table",
            Self::TableRow => "table_row",
            Self::Image => "image",
            Self::Other(tag) => tag,
        }
    }

    /// Heading level (1-3) for heading tags of either naming scheme.
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::Heading1 | Self::Header => Some(1),
            Self::Heading2 | Self::SubHeader => Some(2),
            Self::Heading3 | Self::SubSubHeader => Some(3),
            _ => None,
        }
    }

    /// Whether traversal stops at blocks of this type.
    ///
    /// A nested page is its own document: it shows up by title in its parent
    /// but its children are never pulled into the parent's output.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Page)
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<&str> for BlockType {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
