//! Retention policy resolution.
//!
//! Each sweep takes its limit either as an explicit override or from
//! the preference store, keyed `{Kind}__{setting}`. A missing value
//! with no override is fatal to that sweep invocation; nothing is
//! deleted on a guess.

use std::collections::HashMap;
use std::sync::Arc;

use crate::kind::RecordKind;

/// Bytes per GiB. Every byte/GiB boundary in the crate goes through
/// this constant.
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Convert a GiB-denominated limit to bytes.
pub fn gib_to_bytes(gib: u64) -> u64 {
    gib.saturating_mul(GIB)
}

/// Convert bytes to fractional GiB for display.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / GIB as f64
}

/// Setting name for the age limit, in days.
pub const SETTING_STORAGE_DAYS: &str = "limit_storage_days";
/// Setting name for the duplicate-crash cap.
pub const SETTING_DUPLICATE_NUMBER: &str = "duplicate_number";
/// Setting name for the size cap, in GiB.
pub const SETTING_LIMIT_SIZE: &str = "limit_size";

/// Read-only numeric preference lookup. The dynamic-preferences
/// backend is external; this is its seam.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<u64>;
}

/// Preference store backed by a fixed map, typically loaded from the
/// `[preferences]` configuration table.
#[derive(Debug, Clone, Default)]
pub struct StaticPreferences {
    values: HashMap<String, u64>,
}

impl StaticPreferences {
    pub fn new(values: HashMap<String, u64>) -> Self {
        Self { values }
    }
}

impl PreferenceStore for StaticPreferences {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }
}

/// Errors from policy resolution.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("no value for preference '{key}' and no explicit limit supplied")]
    Missing { key: String },
}

/// Resolves per-kind retention knobs against the preference store.
#[derive(Clone)]
pub struct PolicyResolver {
    prefs: Arc<dyn PreferenceStore>,
}

impl PolicyResolver {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    fn resolve(&self, key: String, explicit: Option<u64>) -> Result<u64, PolicyError> {
        if let Some(value) = explicit {
            return Ok(value);
        }
        self.prefs
            .get(&key)
            .ok_or(PolicyError::Missing { key })
    }

    /// Maximum record age in days for `kind`.
    pub fn max_age_days(
        &self,
        kind: RecordKind,
        explicit: Option<u64>,
    ) -> Result<u64, PolicyError> {
        self.resolve(kind.preference_key(SETTING_STORAGE_DAYS), explicit)
    }

    /// Duplicate cap per crash signature.
    pub fn max_duplicate_count(&self, explicit: Option<u64>) -> Result<u64, PolicyError> {
        self.resolve(
            RecordKind::Crash.preference_key(SETTING_DUPLICATE_NUMBER),
            explicit,
        )
    }

    /// Size cap in bytes for `kind`. The preference is stored in GiB;
    /// an explicit override is already in bytes.
    pub fn max_total_size_bytes(
        &self,
        kind: RecordKind,
        explicit: Option<u64>,
    ) -> Result<u64, PolicyError> {
        if let Some(bytes) = explicit {
            return Ok(bytes);
        }
        let key = kind.preference_key(SETTING_LIMIT_SIZE);
        let gib = self
            .prefs
            .get(&key)
            .ok_or(PolicyError::Missing { key })?;
        Ok(gib_to_bytes(gib))
    }

    /// Size cap in bytes for monitoring, or None when unconfigured.
    /// The monitor degrades gracefully instead of failing the run.
    pub fn size_limit_bytes(&self, kind: RecordKind) -> Option<u64> {
        self.prefs
            .get(&kind.preference_key(SETTING_LIMIT_SIZE))
            .map(gib_to_bytes)
    }
}
