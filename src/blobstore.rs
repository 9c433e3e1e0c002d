//! Blob store adapter.
//!
//! Wraps an [`ObjectStore`] with the two operations the janitor
//! needs: idempotent key deletion and prefix listing. Every store
//! call is bounded by the configured timeout so a slow store can
//! never hang a sweep.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;

/// Error types for blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("listing object store prefix '{prefix}' failed: {source}")]
    List {
        prefix: String,
        source: object_store::Error,
    },

    #[error("listing object store prefix '{prefix}' timed out after {timeout:?}")]
    ListTimeout { prefix: String, timeout: Duration },
}

/// Outcome of a bulk key deletion. Keys that were removed (or were
/// already gone) land in `deleted`; keys whose fate is unknown after
/// a transport error or timeout land in `failed`.
#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    pub deleted: BTreeSet<String>,
    pub failed: BTreeSet<String>,
}

/// Object-store access scoped to what retention sweeps need.
#[derive(Clone)]
pub struct BlobStoreAdapter {
    store: Arc<dyn ObjectStore>,
    op_timeout: Duration,
}

impl BlobStoreAdapter {
    pub fn new(store: Arc<dyn ObjectStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    /// Delete the given keys from the store.
    ///
    /// A key that does not exist counts as deleted: the store is
    /// eventually consistent and stale catalog references are
    /// expected. Individual transport failures are recorded in the
    /// outcome instead of failing the call, so callers can keep the
    /// affected records for a later retry.
    pub async fn delete_keys(&self, keys: &BTreeSet<String>) -> DeleteOutcome {
        let mut outcome = DeleteOutcome::default();

        for key in keys {
            let path = ObjectPath::from(key.as_str());
            match tokio::time::timeout(self.op_timeout, self.store.delete(&path)).await {
                Ok(Ok(())) => {
                    outcome.deleted.insert(key.clone());
                }
                Ok(Err(object_store::Error::NotFound { .. })) => {
                    // Already gone, which is what we wanted
                    tracing::debug!(key = %key, "blob already absent, treating delete as success");
                    outcome.deleted.insert(key.clone());
                }
                Ok(Err(e)) => {
                    tracing::warn!(key = %key, error = %e, "blob delete failed, deferring record");
                    outcome.failed.insert(key.clone());
                }
                Err(_) => {
                    tracing::warn!(
                        key = %key,
                        timeout = ?self.op_timeout,
                        "blob delete timed out, deferring record"
                    );
                    outcome.failed.insert(key.clone());
                }
            }
        }

        outcome
    }

    /// List every key currently present under `prefix`.
    ///
    /// Callers tolerate failure here by proceeding with an empty
    /// reconciliation set and deferring orphan cleanup to a later
    /// sweep rather than aborting.
    pub async fn list_prefix(&self, prefix: &str) -> Result<BTreeSet<String>, StoreError> {
        let path = ObjectPath::from(prefix);
        let listing = self.store.list(Some(&path));

        let metas: Vec<object_store::ObjectMeta> =
            tokio::time::timeout(self.op_timeout, listing.try_collect())
                .await
                .map_err(|_| StoreError::ListTimeout {
                    prefix: prefix.to_string(),
                    timeout: self.op_timeout,
                })?
                .map_err(|source| StoreError::List {
                    prefix: prefix.to_string(),
                    source,
                })?;

        Ok(metas
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::PutPayload;
    use object_store::memory::InMemory;

    fn adapter() -> (Arc<InMemory>, BlobStoreAdapter) {
        let store = Arc::new(InMemory::new());
        let adapter = BlobStoreAdapter::new(store.clone(), Duration::from_secs(5));
        (store, adapter)
    }

    async fn put(store: &InMemory, key: &str) {
        store
            .put(&ObjectPath::from(key), PutPayload::from_static(b"blob"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_existing_keys() {
        let (store, adapter) = adapter();
        put(&store, "build/1.0.0/app.crx").await;
        put(&store, "build/1.0.1/app.crx").await;

        let keys: BTreeSet<String> = ["build/1.0.0/app.crx", "build/1.0.1/app.crx"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let outcome = adapter.delete_keys(&keys).await;

        assert_eq!(outcome.deleted.len(), 2);
        assert!(outcome.failed.is_empty());
        assert!(
            adapter
                .list_prefix("build")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_success() {
        let (_store, adapter) = adapter();

        let keys: BTreeSet<String> = ["minidump/never-existed.dmp".to_string()]
            .into_iter()
            .collect();
        let outcome = adapter.delete_keys(&keys).await;

        assert!(outcome.deleted.contains("minidump/never-existed.dmp"));
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_list_prefix_scopes_to_prefix() {
        let (store, adapter) = adapter();
        put(&store, "symbols/app.sym").await;
        put(&store, "build/app.crx").await;

        let keys = adapter.list_prefix("symbols").await.unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("symbols/app.sym"));
    }

    #[tokio::test]
    async fn test_list_empty_prefix() {
        let (_store, adapter) = adapter();
        let keys = adapter.list_prefix("feedback_attach").await.unwrap();
        assert!(keys.is_empty());
    }
}
