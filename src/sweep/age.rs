//! Age-based retention.

use chrono::{Duration, Utc};

use super::{SweepError, Sweeper};
use crate::kind::RecordKind;
use crate::record::DeletionResult;

impl Sweeper {
    /// Delete every record of `kind` older than the configured age.
    ///
    /// `max_age_days` overrides the `{Kind}__limit_storage_days`
    /// preference. When nothing qualifies the sweep returns (0, 0)
    /// without touching the object store.
    pub async fn delete_older_than(
        &self,
        kind: RecordKind,
        max_age_days: Option<u64>,
    ) -> Result<DeletionResult, SweepError> {
        let days = self.policy.max_age_days(kind, max_age_days)?;
        let cutoff = Utc::now() - Duration::days(days as i64);

        let candidates = self.catalog.records_older_than(kind, cutoff).await?;
        if candidates.is_empty() {
            tracing::debug!(kind = %kind, max_age_days = days, "no records past retention age");
            return Ok(DeletionResult::default());
        }

        tracing::info!(
            kind = %kind,
            max_age_days = days,
            cutoff = %cutoff.to_rfc3339(),
            candidates = candidates.len(),
            "starting age retention sweep"
        );

        let result = self.bulk.delete(kind, candidates).await?;

        tracing::info!(
            kind = %kind,
            deleted = result.count,
            bytes_freed = result.bytes_freed,
            "age retention sweep complete"
        );

        Ok(result)
    }
}
