//! Duplicate-crash collapse.

use super::{SWEEP_BATCH_SIZE, SweepError, Sweeper};
use crate::kind::RecordKind;
use crate::record::DeletionResult;

impl Sweeper {
    /// Delete excess crash reports sharing a signature beyond the cap.
    ///
    /// `max_duplicate_count` overrides the `Crash__duplicate_number`
    /// preference. For each over-cap signature the oldest excess
    /// records are deleted in batches of at most
    /// [`SWEEP_BATCH_SIZE`], leaving exactly `cap` per signature.
    pub async fn delete_duplicate_crashes(
        &self,
        max_duplicate_count: Option<u64>,
    ) -> Result<DeletionResult, SweepError> {
        let cap = self.policy.max_duplicate_count(max_duplicate_count)?;
        let mut totals = DeletionResult::default();

        let groups = self.catalog.crash_signature_counts().await?;
        let over_cap: Vec<(String, u64)> =
            groups.into_iter().filter(|(_, count)| *count > cap).collect();

        if over_cap.is_empty() {
            tracing::debug!(cap, "no crash signature exceeds the duplicate cap");
            return Ok(totals);
        }

        tracing::info!(
            cap,
            groups = over_cap.len(),
            "starting duplicate crash collapse"
        );

        for (signature, count) in over_cap {
            let mut remaining = count;
            while remaining > cap {
                let take = ((remaining - cap) as usize).min(SWEEP_BATCH_SIZE);
                let batch = self
                    .catalog
                    .oldest_crashes_with_signature(&signature, take)
                    .await?;
                if batch.is_empty() {
                    // Group shrank underneath us (concurrent sweep);
                    // the next run re-counts from scratch
                    tracing::warn!(
                        signature = %signature,
                        remaining,
                        cap,
                        "no more candidates for over-cap signature, moving on"
                    );
                    break;
                }

                let selected = batch.len() as u64;
                totals += self.bulk.delete(RecordKind::Crash, batch).await?;
                remaining -= selected;
            }
        }

        tracing::info!(
            deleted = totals.count,
            bytes_freed = totals.bytes_freed,
            "duplicate crash collapse complete"
        );

        Ok(totals)
    }
}
