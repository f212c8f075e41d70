//! Store trait and error types.
//!
//! Provides the [`BlockStore`] trait for fetching block records, along with
//! [`StoreError`] for unified error handling across backends.

use std::future::Future;
use std::path::PathBuf;

use pagemd_blocks::BlockRecord;

use crate::types::{RecentEntry, TableSchema};

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Database file or record does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Query rejected by the database (missing table or column, bad SQL).
    InvalidQuery,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Operation timed out.
    Timeout,
    /// Stored data could not be decoded.
    Corrupt,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (missing file, bad schema).
    #[default]
    Permanent,
    /// Retry immediately (timeout).
    Temporary,
    /// Retry with backoff (pool closed, database locked).
    Persistent,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Database path (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Sqlite", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => StoreErrorKind::Timeout,
            _ => StoreErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut => ErrorStatus::Temporary,
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Create a store error from a database driver error.
    #[must_use]
    pub fn sqlx(err: sqlx::Error) -> Self {
        let (kind, status) = match &err {
            sqlx::Error::Database(_) | sqlx::Error::ColumnNotFound(_) => {
                (StoreErrorKind::InvalidQuery, ErrorStatus::Permanent)
            }
            sqlx::Error::RowNotFound => (StoreErrorKind::NotFound, ErrorStatus::Permanent),
            sqlx::Error::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                (StoreErrorKind::PermissionDenied, ErrorStatus::Permanent)
            }
            sqlx::Error::PoolTimedOut => (StoreErrorKind::Timeout, ErrorStatus::Temporary),
            sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                (StoreErrorKind::Unavailable, ErrorStatus::Persistent)
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                (StoreErrorKind::Corrupt, ErrorStatus::Permanent)
            }
            _ => (StoreErrorKind::Other, ErrorStatus::Permanent),
        };
        Self::new(kind).with_status(status).with_source(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidQuery => "Invalid query",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::Timeout => "Timeout",
            StoreErrorKind::Corrupt => "Corrupt data",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read access to a hierarchical block store.
///
/// Implementations return records already joined with creator names, with
/// `properties`/`content` decoded from their wire encoding (`None` when that
/// fails). The store is never written to.
pub trait BlockStore: Send + Sync {
    /// Fetch one block by id.
    ///
    /// Returns `Ok(None)` if no block has that id.
    fn block(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<BlockRecord>, StoreError>> + Send;

    /// Fetch every descendant of `page_id`, the page itself excluded.
    ///
    /// Ordered by nesting level, then headings before other blocks, then by
    /// last edit time.
    fn descendants(
        &self,
        page_id: &str,
    ) -> impl Future<Output = Result<Vec<BlockRecord>, StoreError>> + Send;

    /// Most recently edited blocks, newest first.
    fn recent_entries(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<RecentEntry>, StoreError>> + Send;

    /// Describe every table in the store.
    ///
    /// Backends without a relational schema return an empty list.
    fn schema(&self) -> impl Future<Output = Result<Vec<TableSchema>, StoreError>> + Send;
}
