//! Janitor Service
//!
//! One-shot housekeeping run: age retention, duplicate-crash
//! collapse, and size-quota enforcement over every record kind,
//! followed by the quota monitor. Scheduling is external (cron or a
//! systemd timer invokes the binary).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use janitor::alert::TracingAlertSink;
use janitor::blobstore::BlobStoreAdapter;
use janitor::cache::InMemorySizeCache;
use janitor::catalog::InMemoryCatalog;
use janitor::config::JanitorConfig;
use janitor::kind::RecordKind;
use janitor::monitor::QuotaMonitor;
use janitor::policy::StaticPreferences;
use janitor::record::DeletionResult;
use janitor::storage::create_object_store;
use janitor::sweep::{SweepError, Sweeper};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "janitor.toml")]
    config: String,

    /// Skip age-based retention
    #[arg(long)]
    no_age: bool,

    /// Skip duplicate-crash collapse
    #[arg(long)]
    no_duplicates: bool,

    /// Skip size-quota enforcement
    #[arg(long)]
    no_quota: bool,
}

fn log_sweep(
    label: &str,
    kind: Option<RecordKind>,
    outcome: Result<DeletionResult, SweepError>,
) {
    match outcome {
        Ok(result) => {
            tracing::info!(
                sweep = label,
                kind = kind.map(|k| k.name()),
                deleted = result.count,
                bytes_freed = result.bytes_freed,
                "sweep finished"
            );
        }
        Err(e) => {
            tracing::error!(
                sweep = label,
                kind = kind.map(|k| k.name()),
                error = %e,
                "sweep failed"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = if std::path::Path::new(&args.config).exists() {
        JanitorConfig::load_from_path(std::path::Path::new(&args.config))
            .context("Failed to load configuration")?
    } else {
        tracing::info!("configuration file not found, using defaults");
        JanitorConfig::default()
    };

    let store = create_object_store(&config.storage).context("Failed to create object store")?;
    let adapter = BlobStoreAdapter::new(store, config.store_op_timeout);
    let prefs = Arc::new(StaticPreferences::new(config.preferences.clone()));

    // The relational catalog backend is wired in by the deployment;
    // this standalone binary runs against the in-memory catalog so the
    // sweep wiring can be exercised end to end.
    let catalog = Arc::new(InMemoryCatalog::new());

    let sweeper = Sweeper::new(catalog.clone(), adapter, prefs.clone());

    if !args.no_age {
        for kind in RecordKind::ALL {
            log_sweep(
                "age_retention",
                Some(kind),
                sweeper.delete_older_than(kind, None).await,
            );
        }
    }

    if !args.no_duplicates {
        log_sweep(
            "duplicate_collapse",
            Some(RecordKind::Crash),
            sweeper.delete_duplicate_crashes(None).await,
        );
    }

    if !args.no_quota {
        for kind in RecordKind::ALL {
            log_sweep(
                "size_quota",
                Some(kind),
                sweeper.enforce_size_quota(kind, None).await,
            );
        }
    }

    let monitor = QuotaMonitor::new(
        catalog,
        prefs,
        Arc::new(InMemorySizeCache::new()),
        Arc::new(TracingAlertSink),
    );
    monitor.check_and_publish().await;

    tracing::info!("janitor run complete");

    Ok(())
}
