//! In-memory catalog implementation for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{Catalog, CatalogResult};
use crate::kind::RecordKind;
use crate::record::CatalogRecord;

/// In-memory catalog backed by a mutex-guarded row vector.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: Mutex<Vec<CatalogRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, as an ingestion path would.
    pub async fn insert(&self, record: CatalogRecord) {
        self.records.lock().await.push(record);
    }

    /// Number of rows of `kind` currently present.
    pub async fn count(&self, kind: RecordKind) -> u64 {
        self.records
            .lock()
            .await
            .iter()
            .filter(|r| r.kind == kind)
            .count() as u64
    }

    /// Fetch a row by id, for assertions.
    pub async fn get(&self, id: i64) -> Option<CatalogRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn sorted_of_kind(records: &[CatalogRecord], kind: RecordKind) -> Vec<CatalogRecord> {
        let mut rows: Vec<CatalogRecord> =
            records.iter().filter(|r| r.kind == kind).cloned().collect();
        rows.sort_by_key(|r| (r.created_at, r.id));
        rows
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn records_older_than(
        &self,
        kind: RecordKind,
        cutoff: DateTime<Utc>,
    ) -> CatalogResult<Vec<CatalogRecord>> {
        let records = self.records.lock().await;
        let mut rows = Self::sorted_of_kind(&records, kind);
        rows.retain(|r| r.created_at <= cutoff);
        Ok(rows)
    }

    async fn oldest_records(
        &self,
        kind: RecordKind,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogRecord>> {
        let records = self.records.lock().await;
        let mut rows = Self::sorted_of_kind(&records, kind);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn crash_signature_counts(&self) -> CatalogResult<Vec<(String, u64)>> {
        let records = self.records.lock().await;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for record in records.iter().filter(|r| r.kind == RecordKind::Crash) {
            if let Some(signature) = &record.signature {
                *counts.entry(signature.clone()).or_default() += 1;
            }
        }
        let mut groups: Vec<(String, u64)> = counts.into_iter().collect();
        groups.sort();
        Ok(groups)
    }

    async fn oldest_crashes_with_signature(
        &self,
        signature: &str,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogRecord>> {
        let records = self.records.lock().await;
        let mut rows = Self::sorted_of_kind(&records, RecordKind::Crash);
        rows.retain(|r| r.signature.as_deref() == Some(signature));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn total_size(&self, kind: RecordKind) -> CatalogResult<u64> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.size)
            .sum())
    }

    async fn delete_records(&self, kind: RecordKind, ids: &[i64]) -> CatalogResult<u64> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| !(r.kind == kind && ids.contains(&r.id)));
        Ok((before - records.len()) as u64)
    }

    async fn clear_blob_fields(&self, kind: RecordKind, ids: &[i64]) -> CatalogResult<()> {
        let mut records = self.records.lock().await;
        for record in records.iter_mut() {
            if record.kind == kind && ids.contains(&record.id) {
                record.blob_keys.clear();
            }
        }
        Ok(())
    }
}
