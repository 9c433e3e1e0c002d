//! Quota monitor.
//!
//! Computes current sizes per collection, publishes them to the
//! fast-read cache, and raises a warning alert when a collection
//! crosses its configured size limit. Runs independently of
//! enforcement; crossing a threshold here does not delete anything.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::alert::{AlertSink, Severity};
use crate::cache::SizeCache;
use crate::catalog::Catalog;
use crate::kind::RecordKind;
use crate::policy::{PolicyResolver, PreferenceStore, bytes_to_gib};

pub struct QuotaMonitor {
    catalog: Arc<dyn Catalog>,
    policy: PolicyResolver,
    cache: Arc<dyn SizeCache>,
    alerts: Arc<dyn AlertSink>,
}

impl QuotaMonitor {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        prefs: Arc<dyn PreferenceStore>,
        cache: Arc<dyn SizeCache>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            catalog,
            policy: PolicyResolver::new(prefs),
            cache,
            alerts,
        }
    }

    /// Compute and publish every kind's total size, alerting on each
    /// kind over its limit.
    ///
    /// The cache is written before the alert is published, and the
    /// sink is fire-and-forget, so one kind's alerting can never
    /// block another kind's cache update. A catalog failure for one
    /// kind is logged and the remaining kinds still run.
    pub async fn check_and_publish(&self) {
        for kind in RecordKind::ALL {
            let size = match self.catalog.total_size(kind).await {
                Ok(size) => size,
                Err(e) => {
                    tracing::error!(kind = %kind, error = %e, "failed to compute collection size");
                    continue;
                }
            };

            self.cache.set(kind.cache_key(), size);
            tracing::debug!(kind = %kind, size, "published collection size");

            let Some(limit) = self.policy.size_limit_bytes(kind) else {
                tracing::warn!(kind = %kind, "no size limit configured, skipping threshold check");
                continue;
            };

            if size > limit {
                let message = format!(
                    "Size limit of {} records is exceeded. Current size is {:.4} GiB",
                    kind,
                    bytes_to_gib(size)
                );
                let metadata = HashMap::from([
                    ("kind".to_string(), kind.name().to_string()),
                    ("size_bytes".to_string(), size.to_string()),
                    ("limit_bytes".to_string(), limit.to_string()),
                    ("timestamp".to_string(), Utc::now().timestamp().to_string()),
                ]);
                self.alerts.publish(&message, Severity::Warning, metadata);
            }
        }
    }
}
