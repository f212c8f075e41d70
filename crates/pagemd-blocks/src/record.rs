//! Block records as read from the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::block_type::BlockType;
use crate::rich_text::RichText;

/// Property map of a block. Keys keep their stored order.
pub type Properties = Map<String, Value>;

/// One node of a page, as a flat record.
///
/// Children are referenced by id through `content`; they are not owned. A
/// record is built once per render and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Unique block id.
    pub id: String,
    /// Structural parent, if any.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Type tag.
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Property name to rich-text value. `None` when absent or undecodable.
    #[serde(default)]
    pub properties: Option<Properties>,
    /// Ordered child ids. `None` when absent or undecodable.
    #[serde(default)]
    pub content: Option<Vec<String>>,
    /// Creation instant in epoch milliseconds.
    #[serde(default)]
    pub created_time: Option<i64>,
    /// Last edit instant in epoch milliseconds.
    #[serde(default)]
    pub last_edited_time: Option<i64>,
    /// Display name of the creator.
    #[serde(default)]
    pub created_by_name: Option<String>,
    /// Liveness flag. Older schemas don't have it.
    #[serde(default)]
    pub alive: Option<bool>,
}

impl BlockRecord {
    /// Create a record with only an id and a type.
    #[must_use]
    pub fn new(id: impl Into<String>, block_type: impl Into<BlockType>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            block_type: block_type.into(),
            properties: None,
            content: None,
            created_time: None,
            last_edited_time: None,
            created_by_name: None,
            alive: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set a raw property value.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        self
    }

    /// Set `properties.title` to a single plain fragment.
    #[must_use]
    pub fn with_title(self, title: &str) -> Self {
        self.with_property("title", Value::Array(vec![Value::Array(vec![title.into()])]))
    }

    #[must_use]
    pub fn with_content<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = Some(children.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_times(mut self, created_ms: i64, last_edited_ms: i64) -> Self {
        self.created_time = Some(created_ms);
        self.last_edited_time = Some(last_edited_ms);
        self
    }

    #[must_use]
    pub fn with_creator(mut self, name: impl Into<String>) -> Self {
        self.created_by_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_alive(mut self, alive: bool) -> Self {
        self.alive = Some(alive);
        self
    }

    /// Raw property value by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(name)
    }

    /// Decoded rich-text property by name.
    #[must_use]
    pub fn rich_text(&self, name: &str) -> Option<RichText> {
        self.property(name).map(RichText::from_value)
    }

    /// Decoded `title` property.
    #[must_use]
    pub fn title(&self) -> Option<RichText> {
        self.rich_text("title")
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_time.and_then(DateTime::from_timestamp_millis)
    }

    #[must_use]
    pub fn last_edited_at(&self) -> Option<DateTime<Utc>> {
        self.last_edited_time.and_then(DateTime::from_timestamp_millis)
    }

    /// False only for records explicitly marked as deleted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.alive != Some(false)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_builder() {
        let block = BlockRecord::new("b1", "to_do")
            .with_parent("p1")
            .with_title("Buy milk")
            .with_content(["c1", "c2"]);

        assert_eq!(block.block_type, BlockType::ToDo);
        assert_eq!(block.parent_id.as_deref(), Some("p1"));
        assert_eq!(block.title().unwrap().plain_text(), "Buy milk");
        assert_eq!(
            block.content,
            Some(vec!["c1".to_owned(), "c2".to_owned()])
        );
    }

    #[test]
    fn test_deserialize_store_shape() {
        let block: BlockRecord = serde_json::from_value(json!({
            "id": "b1",
            "parent_id": "p1",
            "type": "sub_header",
            "properties": {"title": [["Setup", [["b"]]]]},
            "content": ["c1"],
            "created_time": 1_700_000_000_000_i64,
            "created_by_name": "Ada"
        }))
        .unwrap();

        assert_eq!(block.block_type, BlockType::SubHeader);
        assert_eq!(block.content.as_deref(), Some(&["c1".to_owned()][..]));
        assert_eq!(block.created_by_name.as_deref(), Some("Ada"));
        assert!(block.last_edited_time.is_none());
        assert!(block.alive.is_none());
    }

    #[test]
    fn test_property_order_is_preserved() {
        let block: BlockRecord = serde_json::from_value(json!({
            "id": "row",
            "type": "table_row",
            "properties": {"zz": [["first"]], "aa": [["second"]], "mm": [["third"]]}
        }))
        .unwrap();

        let keys: Vec<&str> = block
            .properties
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn test_timestamps() {
        let block = BlockRecord::new("b1", "text").with_times(0, 1_000);

        assert_eq!(
            block.created_at().unwrap().to_rfc3339(),
            "1970-01-01T00:00:00+00:00"
        );
        assert_eq!(
            block.last_edited_at().unwrap().to_rfc3339(),
            "1970-01-01T00:00:01+00:00"
        );
    }

    #[test]
    fn test_is_live() {
        assert!(BlockRecord::new("a", "text").is_live());
        assert!(BlockRecord::new("a", "text").with_alive(true).is_live());
        assert!(!BlockRecord::new("a", "text").with_alive(false).is_live());
    }

    #[test]
    fn test_missing_title() {
        let block = BlockRecord::new("a", "divider");

        assert!(block.title().is_none());
        assert!(block.property("source").is_none());
    }
}
