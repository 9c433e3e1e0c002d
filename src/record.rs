//! Catalog record and deletion accounting types.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use chrono::{DateTime, Utc};

use crate::kind::RecordKind;

/// A catalog row as seen by the janitor: enough to select, account
/// for, and destroy it. Ingestion-side fields are not carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Catalog primary key.
    pub id: i64,
    /// Collection this record belongs to.
    pub kind: RecordKind,
    /// Creation timestamp; ties broken by ascending id.
    pub created_at: DateTime<Utc>,
    /// Total byte size attributed to this record.
    pub size: u64,
    /// Crash signature used for duplicate grouping (Crash only).
    pub signature: Option<String>,
    /// Blob references: field name to full object-store path.
    /// A missing entry means the field has been nulled out.
    pub blob_keys: BTreeMap<String, String>,
}

impl CatalogRecord {
    pub fn new(id: i64, kind: RecordKind, created_at: DateTime<Utc>, size: u64) -> Self {
        Self {
            id,
            kind,
            created_at,
            size,
            signature: None,
            blob_keys: BTreeMap::new(),
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_blob(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.blob_keys.insert(field.into(), key.into());
        self
    }
}

/// Work actually committed by a deletion pass: rows removed and the
/// bytes they accounted for. Never inflated by attempted-but-deferred
/// work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionResult {
    /// Number of catalog rows deleted.
    pub count: u64,
    /// Sum of `size` over the deleted rows.
    pub bytes_freed: u64,
}

impl DeletionResult {
    pub fn new(count: u64, bytes_freed: u64) -> Self {
        Self { count, bytes_freed }
    }

    /// True when the pass deleted nothing.
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.bytes_freed == 0
    }
}

impl AddAssign for DeletionResult {
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        self.bytes_freed += rhs.bytes_freed;
    }
}
