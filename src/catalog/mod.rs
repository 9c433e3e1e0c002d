//! Narrow query contract against the relational catalog.
//!
//! The catalog itself (schema, migrations, connection handling) lives
//! outside this crate; the janitor only needs candidate selection,
//! size aggregation, blob-field nulling, and row deletion. "Oldest"
//! always means ascending `(created_at, id)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::kind::RecordKind;
use crate::record::CatalogRecord;

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog query failed: {0}")]
    Query(String),

    #[error("catalog delete failed: {0}")]
    Delete(String),

    #[error("catalog update failed: {0}")]
    Update(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Query capabilities the catalog backend must provide.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Records of `kind` with `created_at <= cutoff`, oldest first.
    async fn records_older_than(
        &self,
        kind: RecordKind,
        cutoff: DateTime<Utc>,
    ) -> CatalogResult<Vec<CatalogRecord>>;

    /// Up to `limit` oldest records of `kind`.
    async fn oldest_records(
        &self,
        kind: RecordKind,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogRecord>>;

    /// Per-signature counts over all crash records.
    async fn crash_signature_counts(&self) -> CatalogResult<Vec<(String, u64)>>;

    /// Up to `limit` oldest crash records sharing `signature`.
    async fn oldest_crashes_with_signature(
        &self,
        signature: &str,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogRecord>>;

    /// Sum of `size` over all records of `kind`.
    async fn total_size(&self, kind: RecordKind) -> CatalogResult<u64>;

    /// Delete the rows with the given ids. Returns the number of rows
    /// actually removed.
    async fn delete_records(&self, kind: RecordKind, ids: &[i64]) -> CatalogResult<u64>;

    /// Null out every blob-reference field on the given rows so their
    /// keys are no longer referenced. The rows themselves remain.
    async fn clear_blob_fields(&self, kind: RecordKind, ids: &[i64]) -> CatalogResult<()>;
}

pub mod memory;
pub use memory::InMemoryCatalog;
