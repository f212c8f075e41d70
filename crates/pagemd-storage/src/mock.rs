//! Mock store implementation for testing.
//!
//! Provides [`MockStore`] for unit testing without a database file.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use pagemd_blocks::{BlockRecord, BlockType};

use crate::store::{BlockStore, StoreError, StoreErrorKind};
use crate::types::{RecentEntry, TableSchema};

const BACKEND: &str = "Mock";

/// Same cap the SQLite backend puts on hierarchy recursion.
const MAX_DEPTH: usize = 64;

/// Rank used to order siblings: classic headings first.
fn heading_rank(block_type: &BlockType) -> u8 {
    match block_type {
        BlockType::Header => 1,
        BlockType::SubHeader => 2,
        BlockType::SubSubHeader => 3,
        _ => 4,
    }
}

/// Mock store for testing.
///
/// Holds block records in memory and answers queries the way the SQLite
/// backend does. Use the builder methods to configure it with test data.
///
/// # Example
///
/// ```ignore
/// use pagemd_blocks::BlockRecord;
/// use pagemd_storage::{BlockStore, MockStore};
///
/// let store = MockStore::new()
///     .with_block(BlockRecord::new("page", "page").with_content(["b1"]))
///     .with_block(BlockRecord::new("b1", "text").with_parent("page").with_title("Hi"));
///
/// let blocks = store.descendants("page").await?;
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    blocks: RwLock<Vec<BlockRecord>>,
    tables: RwLock<Vec<TableSchema>>,
    failure: RwLock<Option<StoreErrorKind>>,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block record.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_block(self, block: BlockRecord) -> Self {
        self.blocks.write().unwrap().push(block);
        self
    }

    /// Add several block records.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_blocks(self, blocks: impl IntoIterator<Item = BlockRecord>) -> Self {
        self.blocks.write().unwrap().extend(blocks);
        self
    }

    /// Add a table description returned by [`BlockStore::schema`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_table(self, table: TableSchema) -> Self {
        self.tables.write().unwrap().push(table);
        self
    }

    /// Make every subsequent query fail with the given kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, kind: StoreErrorKind) -> Self {
        *self.failure.write().unwrap() = Some(kind);
        self
    }

    fn check(&self) -> Result<(), StoreError> {
        match *self.failure.read().unwrap() {
            Some(kind) => Err(StoreError::new(kind).with_backend(BACKEND)),
            None => Ok(()),
        }
    }

    /// Walk `parent_id` links upwards, returning the topmost ancestor held by
    /// the store and the number of levels walked (the top itself is 1).
    fn root_of<'a>(
        by_id: &HashMap<&str, &'a BlockRecord>,
        block: &'a BlockRecord,
    ) -> (&'a str, i64) {
        let mut current = block;
        let mut level = 1;
        let mut seen = HashSet::from([current.id.as_str()]);
        while let Some(parent) = current
            .parent_id
            .as_deref()
            .and_then(|id| by_id.get(id).copied())
        {
            if !seen.insert(parent.id.as_str()) || seen.len() > MAX_DEPTH {
                break;
            }
            current = parent;
            level += 1;
        }
        (current.id.as_str(), level)
    }
}

impl BlockStore for MockStore {
    async fn block(&self, id: &str) -> Result<Option<BlockRecord>, StoreError> {
        self.check()?;
        Ok(self
            .blocks
            .read()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn descendants(&self, page_id: &str) -> Result<Vec<BlockRecord>, StoreError> {
        self.check()?;
        let blocks = self.blocks.read().unwrap();

        let mut found: Vec<(usize, &BlockRecord)> = Vec::new();
        let mut frontier = vec![page_id];
        for level in 1..=MAX_DEPTH {
            let layer: Vec<&BlockRecord> = blocks
                .iter()
                .filter(|b| {
                    b.parent_id
                        .as_deref()
                        .is_some_and(|parent| frontier.contains(&parent))
                })
                .collect();
            if layer.is_empty() {
                break;
            }
            frontier = layer.iter().map(|b| b.id.as_str()).collect();
            found.extend(layer.into_iter().map(|b| (level, b)));
        }

        found.sort_by_key(|(level, b)| {
            (*level, heading_rank(&b.block_type), b.last_edited_time)
        });
        Ok(found.into_iter().map(|(_, b)| b.clone()).collect())
    }

    async fn recent_entries(&self, limit: u32) -> Result<Vec<RecentEntry>, StoreError> {
        self.check()?;
        let blocks = self.blocks.read().unwrap();
        let by_id: HashMap<&str, &BlockRecord> =
            blocks.iter().map(|b| (b.id.as_str(), b)).collect();

        let mut edited: Vec<&BlockRecord> = blocks
            .iter()
            .filter(|b| b.last_edited_time.is_some())
            .collect();
        edited.sort_by_key(|b| Reverse(b.last_edited_time));

        Ok(edited
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|b| {
                let (root, level) = Self::root_of(&by_id, b);
                RecentEntry {
                    block: BlockRecord {
                        content: None,
                        ..b.clone()
                    },
                    space_id: None,
                    version: None,
                    collection_id: None,
                    root_page_id: Some(root.to_owned()),
                    level: Some(level),
                }
            })
            .collect())
    }

    async fn schema(&self) -> Result<Vec<TableSchema>, StoreError> {
        self.check()?;
        Ok(self.tables.read().unwrap().clone())
    }
}
