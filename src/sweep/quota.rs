//! Size-quota enforcement.

use super::{SWEEP_BATCH_SIZE, SweepError, Sweeper};
use crate::kind::RecordKind;
use crate::record::DeletionResult;

impl Sweeper {
    /// Delete oldest records of `kind` until its total size is back
    /// under the cap.
    ///
    /// `max_total_size_bytes` overrides the `{Kind}__limit_size`
    /// preference (which is stored in GiB). Deletion is bounded to
    /// the minimum needed: when a batch would over-delete, only the
    /// oldest-first prefix whose running size covers the excess is
    /// handed to the dispatcher.
    pub async fn enforce_size_quota(
        &self,
        kind: RecordKind,
        max_total_size_bytes: Option<u64>,
    ) -> Result<DeletionResult, SweepError> {
        let cap = self.policy.max_total_size_bytes(kind, max_total_size_bytes)?;
        let mut current = self.catalog.total_size(kind).await?;
        let mut totals = DeletionResult::default();

        if current <= cap {
            tracing::debug!(kind = %kind, current, cap, "collection within size quota");
            return Ok(totals);
        }

        tracing::info!(
            kind = %kind,
            current,
            cap,
            excess = current - cap,
            "starting size quota enforcement"
        );

        while current > cap {
            let batch = self.catalog.oldest_records(kind, SWEEP_BATCH_SIZE).await?;
            if batch.is_empty() {
                // Size accounting says we are over cap but there is
                // nothing left to delete. Raise loudly, never spin.
                tracing::error!(
                    kind = %kind,
                    current,
                    cap,
                    "over size cap with no candidate rows, accounting has diverged"
                );
                return Err(SweepError::AccountingDivergence {
                    kind,
                    current_size: current,
                    cap_bytes: cap,
                });
            }

            let excess = current - cap;
            let batch_total: u64 = batch.iter().map(|r| r.size).sum();

            let selected = if batch_total > excess {
                // Minimal oldest-first prefix covering the excess
                let mut running = 0u64;
                let mut cut = 0usize;
                for record in &batch {
                    running += record.size;
                    cut += 1;
                    if running >= excess {
                        break;
                    }
                }
                batch.into_iter().take(cut).collect()
            } else {
                batch
            };

            let round = self.bulk.delete(kind, selected).await?;
            if round.is_empty() {
                // Every record in the round was deferred (store outage
                // or conflicts). Report the partial result; the next
                // run picks up where we left off.
                tracing::warn!(
                    kind = %kind,
                    current,
                    cap,
                    "quota round made no progress, returning partial result"
                );
                break;
            }

            current = current.saturating_sub(round.bytes_freed);
            totals += round;
        }

        tracing::info!(
            kind = %kind,
            deleted = totals.count,
            bytes_freed = totals.bytes_freed,
            remaining_size = current,
            "size quota enforcement complete"
        );

        Ok(totals)
    }
}
