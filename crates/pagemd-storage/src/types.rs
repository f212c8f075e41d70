//! Records returned by store queries other than block fetches.

use pagemd_blocks::BlockRecord;

/// A recently edited block with its position in the workspace.
#[derive(Clone, Debug, PartialEq)]
pub struct RecentEntry {
    /// The block itself. `content` is not loaded.
    pub block: BlockRecord,
    pub space_id: Option<String>,
    pub version: Option<i64>,
    pub collection_id: Option<String>,
    /// Top-level page the block lives under, if it is reachable from one.
    pub root_page_id: Option<String>,
    /// Nesting level below the top-level page (the page itself is 1).
    pub level: Option<i64>,
}

/// Schema description of one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub indexes: Vec<IndexInfo>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Up to three rows, every value as text (`None` for NULL).
    pub sample_rows: Vec<Vec<Option<String>>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
}

/// `from` column of this table referencing `table.to`.
///
/// `to` is `None` when the key references the other table's primary key
/// implicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    pub from: String,
    pub table: String,
    pub to: Option<String>,
}
