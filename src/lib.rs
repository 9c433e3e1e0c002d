//! Janitor Library
//!
//! Storage retention and quota enforcement for the update-server
//! catalog and its blob store. The engine keeps four record
//! collections (versions, crash reports, feedback items, debug
//! symbols) within administrator-defined limits:
//!
//! - Age-based retention drops records older than a configured age
//! - Duplicate collapse caps crash reports sharing a signature
//! - Size-quota enforcement deletes oldest records until a collection
//!   is back under its byte cap
//! - The quota monitor publishes per-collection sizes and raises an
//!   alert when a threshold is crossed
//!
//! All deletion paths go through the bulk deletion dispatcher, which
//! removes referenced blobs from the object store before deleting
//! catalog rows and returns an honest (count, bytes_freed) for the
//! work actually committed.
//!
//! The catalog, preference store, size cache, and alert sink are trait
//! seams; concrete backends live outside this crate. In-memory
//! implementations are provided for tests and local runs.

pub mod alert;
pub mod blobstore;
pub mod bulk;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod kind;
pub mod monitor;
pub mod policy;
pub mod record;
pub mod storage;
pub mod sweep;

// Re-export commonly used types
pub use alert::{AlertSink, Severity, TracingAlertSink};
pub use blobstore::{BlobStoreAdapter, DeleteOutcome};
pub use bulk::BulkDeleter;
pub use cache::SizeCache;
pub use catalog::{Catalog, CatalogError, InMemoryCatalog};
pub use config::JanitorConfig;
pub use kind::{BlobField, RecordKind};
pub use monitor::QuotaMonitor;
pub use policy::{PolicyResolver, PreferenceStore, StaticPreferences};
pub use record::{CatalogRecord, DeletionResult};
pub use sweep::{SweepError, Sweeper};
