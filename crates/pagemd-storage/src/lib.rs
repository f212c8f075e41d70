//! Block storage for the pagemd page renderer.
//!
//! This crate provides a [`BlockStore`] trait for fetching block records from
//! the underlying store, so rendering never touches the database directly.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`BlockStore`] trait with `block()`, `descendants()`, `recent_entries()`
//!   and `schema()` methods
//! - [`SqliteStore`] over the desktop client's read-only cache database
//! - [`MockStore`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use pagemd_storage::{BlockStore, SqliteStore};
//!
//! let store = SqliteStore::open("notion.db").await?;
//! for block in store.descendants("page-id").await? {
//!     println!("{}: {}", block.id, block.block_type);
//! }
//! ```

#[cfg(any(test, feature = "mock"))]
mod mock;
mod sqlite;
mod store;
mod types;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockStore;
pub use sqlite::SqliteStore;
pub use store::{BlockStore, ErrorStatus, StoreError, StoreErrorKind};
pub use types::{ColumnInfo, ForeignKey, IndexInfo, RecentEntry, TableSchema};
