//! Bulk deletion dispatcher.
//!
//! Every sweep funnels its candidate batches through here. The
//! dispatcher removes referenced blobs from the object store first,
//! reconciles which keys are actually gone, and only then deletes
//! catalog rows, so the returned accounting always reflects committed
//! work.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::blobstore::{BlobStoreAdapter, DeleteOutcome};
use crate::catalog::{Catalog, CatalogError};
use crate::kind::RecordKind;
use crate::record::{CatalogRecord, DeletionResult};

/// Deletes a batch of records of one kind as a unit: blobs, then rows.
#[derive(Clone)]
pub struct BulkDeleter {
    catalog: Arc<dyn Catalog>,
    store: BlobStoreAdapter,
}

impl BulkDeleter {
    pub fn new(catalog: Arc<dyn Catalog>, store: BlobStoreAdapter) -> Self {
        Self { catalog, store }
    }

    /// Delete `records` and their blobs, returning the committed
    /// (count, bytes_freed).
    ///
    /// Records whose blob keys are still present in the store after
    /// the delete attempt get their references nulled and stay in the
    /// catalog for a later sweep; records whose blob fate is unknown
    /// (store error or timeout) are kept untouched so nothing is ever
    /// counted as freed without being gone.
    pub async fn delete(
        &self,
        kind: RecordKind,
        records: Vec<CatalogRecord>,
    ) -> Result<DeletionResult, CatalogError> {
        if records.is_empty() {
            return Ok(DeletionResult::default());
        }

        let fields = kind.blob_fields();

        // Every non-empty blob key referenced by the batch, across all fields.
        let referenced: BTreeSet<String> = records
            .iter()
            .flat_map(|r| r.blob_keys.values().cloned())
            .filter(|key| !key.is_empty())
            .collect();

        let outcome = if referenced.is_empty() {
            DeleteOutcome::default()
        } else {
            self.store.delete_keys(&referenced).await
        };

        // Reconcile against what the store still holds. A listing
        // outage degrades to an empty set; orphaned keys are picked up
        // by a later sweep.
        let mut existing = BTreeSet::new();
        if !referenced.is_empty() {
            for field in fields {
                match self.store.list_prefix(field.prefix).await {
                    Ok(keys) => existing.extend(keys),
                    Err(e) => {
                        tracing::warn!(
                            kind = %kind,
                            prefix = field.prefix,
                            error = %e,
                            "prefix listing unavailable, proceeding with empty reconciliation"
                        );
                    }
                }
            }
        }

        // Keys the bulk delete could not remove.
        let conflicts: BTreeSet<&String> = referenced.intersection(&existing).collect();

        let mut deferred_unknown: Vec<i64> = Vec::new();
        let mut deferred_conflict: Vec<i64> = Vec::new();
        let mut deletable: Vec<&CatalogRecord> = Vec::new();

        for record in &records {
            let keys: Vec<&String> = record
                .blob_keys
                .values()
                .filter(|key| !key.is_empty())
                .collect();
            if keys.iter().any(|key| outcome.failed.contains(*key)) {
                // Blob status unknown: keep the row as-is and retry later
                deferred_unknown.push(record.id);
            } else if keys.iter().any(|key| conflicts.contains(key)) {
                deferred_conflict.push(record.id);
            } else {
                deletable.push(record);
            }
        }

        // Conflicted records lose their references so the keys stop
        // being re-attempted; the rows are swept on a later run
        // without double-counting their bytes.
        if !deferred_conflict.is_empty() {
            tracing::warn!(
                kind = %kind,
                deferred = deferred_conflict.len(),
                "blobs still present after delete, nulling references and keeping rows"
            );
            self.catalog
                .clear_blob_fields(kind, &deferred_conflict)
                .await?;
        }

        let count = deletable.len() as u64;
        let bytes_freed: u64 = deletable.iter().map(|r| r.size).sum();

        if !deletable.is_empty() {
            let ids: Vec<i64> = deletable.iter().map(|r| r.id).collect();
            self.catalog.delete_records(kind, &ids).await?;
        }

        tracing::info!(
            kind = %kind,
            batch = records.len(),
            deleted = count,
            bytes_freed,
            deferred_conflict = deferred_conflict.len(),
            deferred_unknown = deferred_unknown.len(),
            "bulk deletion batch complete"
        );

        Ok(DeletionResult::new(count, bytes_freed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use chrono::{Duration as ChronoDuration, Utc};
    use object_store::memory::InMemory;
    use object_store::path::Path as ObjectPath;
    use object_store::{ObjectStore, PutPayload};
    use std::time::Duration;

    struct Fixture {
        catalog: Arc<InMemoryCatalog>,
        store: Arc<InMemory>,
        deleter: BulkDeleter,
    }

    fn fixture() -> Fixture {
        let catalog = Arc::new(InMemoryCatalog::new());
        let store = Arc::new(InMemory::new());
        let adapter = BlobStoreAdapter::new(store.clone(), Duration::from_secs(5));
        let deleter = BulkDeleter::new(catalog.clone(), adapter);
        Fixture {
            catalog,
            store,
            deleter,
        }
    }

    async fn put(store: &InMemory, key: &str) {
        store
            .put(&ObjectPath::from(key), PutPayload::from_static(b"blob"))
            .await
            .unwrap();
    }

    fn crash(id: i64, size: u64, key: &str) -> CatalogRecord {
        CatalogRecord::new(
            id,
            RecordKind::Crash,
            Utc::now() - ChronoDuration::days(id),
            size,
        )
        .with_signature("sig")
        .with_blob("minidump", key)
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let fx = fixture();
        let result = fx
            .deleter
            .delete(RecordKind::Crash, Vec::new())
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_deletes_blobs_and_rows() {
        let fx = fixture();
        put(&fx.store, "minidump/a.dmp").await;
        put(&fx.store, "minidump/b.dmp").await;

        let a = crash(1, 100, "minidump/a.dmp");
        let b = crash(2, 200, "minidump/b.dmp");
        fx.catalog.insert(a.clone()).await;
        fx.catalog.insert(b.clone()).await;

        let result = fx
            .deleter
            .delete(RecordKind::Crash, vec![a, b])
            .await
            .unwrap();

        assert_eq!(result, DeletionResult::new(2, 300));
        assert_eq!(fx.catalog.count(RecordKind::Crash).await, 0);
        assert!(
            fx.store
                .get(&ObjectPath::from("minidump/a.dmp"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_stale_reference_still_deletes_row() {
        // Key in the catalog, blob already gone from the store
        let fx = fixture();
        let a = crash(1, 100, "minidump/long-gone.dmp");
        fx.catalog.insert(a.clone()).await;

        let result = fx.deleter.delete(RecordKind::Crash, vec![a]).await.unwrap();

        assert_eq!(result, DeletionResult::new(1, 100));
        assert_eq!(fx.catalog.count(RecordKind::Crash).await, 0);
    }

    #[tokio::test]
    async fn test_records_without_blobs_skip_store_entirely() {
        let fx = fixture();
        let record = CatalogRecord::new(7, RecordKind::Feedback, Utc::now(), 50);
        fx.catalog.insert(record.clone()).await;

        let result = fx
            .deleter
            .delete(RecordKind::Feedback, vec![record])
            .await
            .unwrap();

        assert_eq!(result, DeletionResult::new(1, 50));
    }

    #[tokio::test]
    async fn test_bytes_freed_matches_deleted_rows_only() {
        let fx = fixture();
        put(&fx.store, "minidump/a.dmp").await;
        let a = crash(1, 111, "minidump/a.dmp");
        let b = crash(2, 222, "minidump/missing.dmp");
        fx.catalog.insert(a.clone()).await;
        fx.catalog.insert(b.clone()).await;

        let result = fx
            .deleter
            .delete(RecordKind::Crash, vec![a, b])
            .await
            .unwrap();

        // Both rows are deletable (one blob deleted, one already absent)
        assert_eq!(result.count, 2);
        assert_eq!(result.bytes_freed, 333);
    }
}
