//! SQLite backend over the desktop client's local cache database.
//!
//! Blocks live in a `block` table whose `properties` and `content` columns
//! hold JSON text. Creator names come from `notion_user`. Older databases
//! lack the `alive` column; [`SqliteStore::open`] detects which variant it
//! is looking at and adapts its queries.

use std::path::{Path, PathBuf};

use pagemd_blocks::BlockRecord;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Row};

use crate::store::{BlockStore, StoreError};
use crate::types::{ColumnInfo, ForeignKey, IndexInfo, RecentEntry, TableSchema};

const BACKEND: &str = "Sqlite";

/// Recursion cap for hierarchy queries, so `parent_id` cycles terminate.
const MAX_DEPTH: u32 = 64;

/// Rows fetched per table for schema samples.
const SAMPLE_ROWS: u32 = 3;

#[derive(FromRow)]
struct BlockRow {
    id: String,
    parent_id: Option<String>,
    #[sqlx(rename = "type")]
    block_type: String,
    properties: Option<String>,
    content: Option<String>,
    created_time: Option<i64>,
    last_edited_time: Option<i64>,
    created_by_name: Option<String>,
    alive: Option<bool>,
}

impl BlockRow {
    fn into_record(self) -> BlockRecord {
        let properties = self
            .properties
            .as_deref()
            .and_then(|raw| decode_json(&self.id, "properties", raw));
        let content = self
            .content
            .as_deref()
            .and_then(|raw| decode_json(&self.id, "content", raw));

        BlockRecord {
            id: self.id,
            parent_id: self.parent_id,
            block_type: self.block_type.into(),
            properties,
            content,
            created_time: self.created_time,
            last_edited_time: self.last_edited_time,
            created_by_name: self.created_by_name,
            alive: self.alive,
        }
    }
}

#[derive(FromRow)]
struct RecentRow {
    #[sqlx(flatten)]
    block: BlockRow,
    space_id: Option<String>,
    version: Option<i64>,
    collection_id: Option<String>,
    root_page_id: Option<String>,
    level: Option<i64>,
}

#[derive(FromRow)]
struct ColumnRow {
    name: String,
    #[sqlx(rename = "type")]
    data_type: String,
    notnull: i64,
    dflt_value: Option<String>,
    pk: i64,
}

#[derive(FromRow)]
struct IndexRow {
    name: String,
    unique: i64,
}

#[derive(FromRow)]
struct ForeignKeyRow {
    table: String,
    from: String,
    to: Option<String>,
}

/// Undecodable JSON is treated as absent.
fn decode_json<T: DeserializeOwned>(id: &str, field: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(id, field, error = %e, "Ignoring undecodable JSON column");
            None
        }
    }
}

/// Quote an identifier for interpolation into SQL.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Read-only block store backed by a SQLite file.
///
/// # Example
///
/// ```ignore
/// use pagemd_storage::{BlockStore, SqliteStore};
///
/// let store = SqliteStore::open("notion.db").await?;
/// let blocks = store.descendants("page-id").await?;
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
    has_alive: bool,
    block_sql: String,
    descendants_sql: String,
    recent_sql: String,
}

impl SqliteStore {
    /// Open an existing database read-only.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` or `PermissionDenied` error if the file cannot be
    /// accessed, or the driver error if the connection or schema probe fails.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        std::fs::metadata(&path)
            .map_err(|e| StoreError::io(e, Some(path.clone())).with_backend(BACKEND))?;

        let options = SqliteConnectOptions::new().filename(&path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::sqlx(e).with_path(&path).with_backend(BACKEND))?;

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('block')")
                .fetch_all(&pool)
                .await
                .map_err(|e| StoreError::sqlx(e).with_path(&path).with_backend(BACKEND))?;
        let has_alive = columns.iter().any(|c| c == "alive");

        tracing::debug!(path = %path.display(), has_alive, "Opened block store");

        Ok(Self {
            block_sql: block_sql(has_alive),
            descendants_sql: descendants_sql(has_alive),
            recent_sql: recent_sql(has_alive),
            pool,
            path,
            has_alive,
        })
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the `block` table carries the `alive` column.
    #[must_use]
    pub fn has_alive_column(&self) -> bool {
        self.has_alive
    }

    fn error(&self, err: sqlx::Error) -> StoreError {
        StoreError::sqlx(err)
            .with_path(&self.path)
            .with_backend(BACKEND)
    }

    async fn table_schema(&self, name: String) -> Result<TableSchema, StoreError> {
        let table = quote_ident(&name);

        let columns: Vec<ColumnRow> = sqlx::query_as(&format!("PRAGMA table_info({table})"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.error(e))?;
        let indexes: Vec<IndexRow> = sqlx::query_as(&format!("PRAGMA index_list({table})"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.error(e))?;
        let foreign_keys: Vec<ForeignKeyRow> =
            sqlx::query_as(&format!("PRAGMA foreign_key_list({table})"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| self.error(e))?;

        let sample_rows = match self.sample_rows(&table, &columns).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!(table = %name, error = %e, "Failed to sample table rows");
                Vec::new()
            }
        };

        Ok(TableSchema {
            name,
            columns: columns
                .into_iter()
                .map(|c| ColumnInfo {
                    name: c.name,
                    data_type: c.data_type,
                    not_null: c.notnull != 0,
                    default_value: c.dflt_value,
                    primary_key: c.pk != 0,
                })
                .collect(),
            indexes: indexes
                .into_iter()
                .map(|i| IndexInfo {
                    name: i.name,
                    unique: i.unique != 0,
                })
                .collect(),
            foreign_keys: foreign_keys
                .into_iter()
                .map(|f| ForeignKey {
                    from: f.from,
                    table: f.table,
                    to: f.to,
                })
                .collect(),
            sample_rows,
        })
    }

    async fn sample_rows(
        &self,
        table: &str,
        columns: &[ColumnRow],
    ) -> Result<Vec<Vec<Option<String>>>, sqlx::Error> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let select = columns
            .iter()
            .map(|c| format!("CAST({} AS TEXT)", quote_ident(&c.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let rows = sqlx::query(&format!(
            "SELECT {select} FROM {table} LIMIT {SAMPLE_ROWS}"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                (0..columns.len())
                    .map(|i| row.try_get::<Option<String>, _>(i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

impl BlockStore for SqliteStore {
    async fn block(&self, id: &str) -> Result<Option<BlockRecord>, StoreError> {
        let row: Option<BlockRow> = sqlx::query_as(&self.block_sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.error(e))?;
        Ok(row.map(BlockRow::into_record))
    }

    async fn descendants(&self, page_id: &str) -> Result<Vec<BlockRecord>, StoreError> {
        let rows: Vec<BlockRow> = sqlx::query_as(&self.descendants_sql)
            .bind(page_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.error(e))?;

        tracing::debug!(page_id, count = rows.len(), "Fetched page blocks");
        Ok(rows.into_iter().map(BlockRow::into_record).collect())
    }

    async fn recent_entries(&self, limit: u32) -> Result<Vec<RecentEntry>, StoreError> {
        let rows: Vec<RecentRow> = sqlx::query_as(&self.recent_sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.error(e))?;

        Ok(rows
            .into_iter()
            .map(|row| RecentEntry {
                block: row.block.into_record(),
                space_id: row.space_id,
                version: row.version,
                collection_id: row.collection_id,
                root_page_id: row.root_page_id,
                level: row.level,
            })
            .collect())
    }

    async fn schema(&self) -> Result<Vec<TableSchema>, StoreError> {
        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| self.error(e))?;

        let mut schemas = Vec::with_capacity(tables.len());
        for name in tables {
            schemas.push(self.table_schema(name).await?);
        }
        Ok(schemas)
    }
}

fn alive_expr(has_alive: bool, table: &str) -> String {
    if has_alive {
        format!("CAST({table}.alive AS INTEGER)")
    } else {
        "NULL".to_owned()
    }
}

fn block_sql(has_alive: bool) -> String {
    let alive = alive_expr(has_alive, "block");
    format!(
        "SELECT
            block.id,
            block.parent_id,
            block.type,
            block.properties,
            block.content,
            CAST(block.created_time AS INTEGER) AS created_time,
            CAST(block.last_edited_time AS INTEGER) AS last_edited_time,
            notion_user.name AS created_by_name,
            {alive} AS alive
        FROM block
        LEFT JOIN notion_user ON notion_user.id = block.created_by_id
        WHERE block.id = ?1"
    )
}

fn descendants_sql(has_alive: bool) -> String {
    let root_alive = alive_expr(has_alive, "block");
    let child_alive = alive_expr(has_alive, "b");
    format!(
        "WITH RECURSIVE block_hierarchy AS (
            SELECT
                block.id,
                block.parent_id,
                block.type,
                block.properties,
                block.content,
                CAST(block.created_time AS INTEGER) AS created_time,
                CAST(block.last_edited_time AS INTEGER) AS last_edited_time,
                notion_user.name AS created_by_name,
                {root_alive} AS alive,
                1 AS level
            FROM block
            LEFT JOIN notion_user ON notion_user.id = block.created_by_id
            WHERE block.parent_id = ?1

            UNION ALL

            SELECT
                b.id,
                b.parent_id,
                b.type,
                b.properties,
                b.content,
                CAST(b.created_time AS INTEGER),
                CAST(b.last_edited_time AS INTEGER),
                u.name,
                {child_alive},
                h.level + 1
            FROM block b
            INNER JOIN block_hierarchy h ON h.id = b.parent_id
            LEFT JOIN notion_user u ON u.id = b.created_by_id
            WHERE h.level < {MAX_DEPTH}
        )
        SELECT
            id, parent_id, type, properties, content,
            created_time, last_edited_time, created_by_name, alive
        FROM block_hierarchy
        ORDER BY level ASC, CASE type
            WHEN 'header' THEN 1
            WHEN 'sub_header' THEN 2
            WHEN 'sub_sub_header' THEN 3
            ELSE 4
        END,
        last_edited_time ASC"
    )
}

fn recent_sql(has_alive: bool) -> String {
    let alive = alive_expr(has_alive, "block");
    format!(
        "WITH RECURSIVE page_hierarchy AS (
            SELECT id, 1 AS level, id AS root_page_id
            FROM block
            WHERE parent_table = 'space'

            UNION ALL

            SELECT b.id, h.level + 1, h.root_page_id
            FROM block b
            INNER JOIN page_hierarchy h ON h.id = b.parent_id
            WHERE h.level < {MAX_DEPTH}
        )
        SELECT DISTINCT
            block.id,
            block.parent_id,
            block.type,
            block.properties,
            NULL AS content,
            CAST(block.created_time AS INTEGER) AS created_time,
            CAST(block.last_edited_time AS INTEGER) AS last_edited_time,
            notion_user.name AS created_by_name,
            {alive} AS alive,
            block.space_id,
            CAST(block.version AS INTEGER) AS version,
            block.collection_id,
            page_hierarchy.root_page_id,
            page_hierarchy.level
        FROM block
        LEFT JOIN page_hierarchy ON page_hierarchy.id = block.id
        LEFT JOIN notion_user ON notion_user.id = block.created_by_id
        WHERE block.last_edited_time IS NOT NULL
        ORDER BY last_edited_time DESC
        LIMIT ?1"
    )
}

#[cfg(test)]
mod tests {
    use pagemd_blocks::BlockType;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::store::StoreErrorKind;

    const FIXTURE: &str = r#"
        INSERT INTO notion_user (id, name) VALUES ('u1', 'Ada');

        INSERT INTO block (id, space_id, version, type, properties, content, parent_id, parent_table, created_by_id, created_time, last_edited_time)
        VALUES
            ('page', 's1', 7, 'page', '{"title": [["Doc"]]}', '["h", "p", "bad"]', 's1', 'space', 'u1', 1000, 100),
            ('p', 's1', 1, 'text', '{"title": [["Hello"]]}', '["li"]', 'page', 'block', 'u1', 1000, 300),
            ('h', 's1', 1, 'header', '{"title": [["Intro"]]}', NULL, 'page', 'block', 'u1', 1000, 400),
            ('li', 's1', 1, 'bulleted_list', '{"title": [["Point"]]}', NULL, 'p', 'block', 'u1', 1000, 200),
            ('bad', 's1', 1, 'text', '{not json', 'also not json', 'page', 'block', 'ghost', 1000, 500);
    "#;

    async fn fixture(with_alive: bool) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notion.db");

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();

        let alive = if with_alive { ", alive INTEGER" } else { "" };
        sqlx::raw_sql(&format!(
            "CREATE TABLE block (
                id TEXT PRIMARY KEY,
                space_id TEXT,
                version INTEGER,
                type TEXT NOT NULL,
                properties TEXT,
                content TEXT,
                collection_id TEXT,
                parent_id TEXT,
                parent_table TEXT,
                created_by_id TEXT,
                created_time INTEGER,
                last_edited_time INTEGER{alive}
            );
            CREATE TABLE notion_user (id TEXT PRIMARY KEY, name TEXT);
            CREATE INDEX block_parent_id ON block (parent_id);"
        ))
        .execute(&pool)
        .await
        .unwrap();
        sqlx::raw_sql(FIXTURE).execute(&pool).await.unwrap();
        if with_alive {
            sqlx::raw_sql("UPDATE block SET alive = 1; UPDATE block SET alive = 0 WHERE id = 'bad';")
                .execute(&pool)
                .await
                .unwrap();
        }

        pool.close().await;
        (dir, path)
    }

    fn ids(blocks: &[BlockRecord]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("missing.db");

        let err = SqliteStore::open(&path).await.unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.backend, Some("Sqlite"));
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_block_by_id() {
        let (_dir, path) = fixture(false).await;
        let store = SqliteStore::open(&path).await.unwrap();

        let page = store.block("page").await.unwrap().unwrap();

        assert_eq!(page.block_type, BlockType::Page);
        assert_eq!(page.title().unwrap().plain_text(), "Doc");
        assert_eq!(
            page.content,
            Some(vec!["h".to_owned(), "p".to_owned(), "bad".to_owned()])
        );
        assert_eq!(page.created_by_name.as_deref(), Some("Ada"));
        assert_eq!(page.created_time, Some(1000));
        assert!(store.block("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_descendants_order() {
        let (_dir, path) = fixture(false).await;
        let store = SqliteStore::open(&path).await.unwrap();

        let blocks = store.descendants("page").await.unwrap();

        assert_eq!(ids(&blocks), vec!["h", "p", "bad", "li"]);
    }

    #[tokio::test]
    async fn test_undecodable_json_and_missing_user() {
        let (_dir, path) = fixture(false).await;
        let store = SqliteStore::open(&path).await.unwrap();

        let blocks = store.descendants("page").await.unwrap();
        let bad = blocks.iter().find(|b| b.id == "bad").unwrap();

        assert!(bad.properties.is_none());
        assert!(bad.content.is_none());
        assert!(bad.created_by_name.is_none());
    }

    #[tokio::test]
    async fn test_schema_without_alive() {
        let (_dir, path) = fixture(false).await;
        let store = SqliteStore::open(&path).await.unwrap();

        assert!(!store.has_alive_column());
        let blocks = store.descendants("page").await.unwrap();
        assert!(blocks.iter().all(|b| b.alive.is_none()));
    }

    #[tokio::test]
    async fn test_schema_with_alive() {
        let (_dir, path) = fixture(true).await;
        let store = SqliteStore::open(&path).await.unwrap();

        assert!(store.has_alive_column());
        let blocks = store.descendants("page").await.unwrap();
        let live: Vec<&str> = blocks
            .iter()
            .filter(|b| b.is_live())
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(live, vec!["h", "p", "li"]);
        assert_eq!(blocks[0].alive, Some(true));
    }

    #[tokio::test]
    async fn test_recent_entries() {
        let (_dir, path) = fixture(false).await;
        let store = SqliteStore::open(&path).await.unwrap();

        let entries = store.recent_entries(3).await.unwrap();

        let entry_ids: Vec<&str> = entries.iter().map(|e| e.block.id.as_str()).collect();
        assert_eq!(entry_ids, vec!["bad", "h", "p"]);
        assert_eq!(entries[1].root_page_id.as_deref(), Some("page"));
        assert_eq!(entries[1].level, Some(2));
        assert_eq!(entries[1].space_id.as_deref(), Some("s1"));
        assert!(entries[1].block.content.is_none());
    }

    #[tokio::test]
    async fn test_recent_entries_root_page() {
        let (_dir, path) = fixture(false).await;
        let store = SqliteStore::open(&path).await.unwrap();

        let entries = store.recent_entries(10).await.unwrap();
        let page = entries.iter().find(|e| e.block.id == "page").unwrap();

        assert_eq!(entries.len(), 5);
        assert_eq!(page.root_page_id.as_deref(), Some("page"));
        assert_eq!(page.level, Some(1));
        assert_eq!(page.version, Some(7));
    }

    #[tokio::test]
    async fn test_schema() {
        let (_dir, path) = fixture(false).await;
        let store = SqliteStore::open(&path).await.unwrap();

        let tables = store.schema().await.unwrap();

        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["block", "notion_user"]);

        let block = &tables[0];
        let id = block.columns.iter().find(|c| c.name == "id").unwrap();
        assert!(id.primary_key);
        let block_type = block.columns.iter().find(|c| c.name == "type").unwrap();
        assert!(block_type.not_null);
        assert_eq!(block_type.data_type, "TEXT");
        assert!(block.indexes.iter().any(|i| i.name == "block_parent_id" && !i.unique));
        assert_eq!(block.sample_rows.len(), 3);

        let users = &tables[1];
        assert_eq!(
            users.sample_rows,
            vec![vec![Some("u1".to_owned()), Some("Ada".to_owned())]]
        );
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("block"), "\"block\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
