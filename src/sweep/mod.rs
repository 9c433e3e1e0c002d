//! Sweep entry points.
//!
//! Each sweep selects candidate records from the catalog and hands
//! them to the bulk deletion dispatcher in bounded batches. Sweeps
//! only await at batch boundaries, so aborting the task cancels
//! between batches and already-committed batches stay deleted.

use std::sync::Arc;

use crate::blobstore::BlobStoreAdapter;
use crate::bulk::BulkDeleter;
use crate::catalog::{Catalog, CatalogError};
use crate::kind::RecordKind;
use crate::policy::{PolicyError, PolicyResolver, PreferenceStore};

pub mod age;
pub mod duplicates;
pub mod quota;

/// Upper bound on records selected per catalog/store round trip.
pub const SWEEP_BATCH_SIZE: usize = 1000;

/// Errors that terminate a sweep invocation.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// No limit configured and none supplied; nothing was deleted.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The tracked size exceeds the cap but the catalog has no
    /// candidate rows left. Size accounting and row counts have
    /// diverged; requires manual reconciliation.
    #[error(
        "size accounting diverged for {kind}: tracked size {current_size} exceeds cap {cap_bytes} but no candidate rows remain"
    )]
    AccountingDivergence {
        kind: RecordKind,
        current_size: u64,
        cap_bytes: u64,
    },
}

/// Runs the retention, duplicate-collapse, and size-quota sweeps over
/// one catalog and blob store.
#[derive(Clone)]
pub struct Sweeper {
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) bulk: BulkDeleter,
    pub(crate) policy: PolicyResolver,
}

impl Sweeper {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: BlobStoreAdapter,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        let bulk = BulkDeleter::new(catalog.clone(), store);
        Self {
            catalog,
            bulk,
            policy: PolicyResolver::new(prefs),
        }
    }
}
