//! Record-kind registry.
//!
//! The janitor manages a closed set of record collections. Each kind
//! maps its blob-carrying catalog fields 1:1 to object-store key
//! prefixes through a static lookup table; adding a kind means adding
//! a table row, not registering anything at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A catalog field that references a blob, paired with the
/// object-store prefix its keys live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobField {
    /// Catalog field name holding the object-store key.
    pub field: &'static str,
    /// Object-store key prefix for this field.
    pub prefix: &'static str,
}

/// The record collections subject to retention and quota enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Application update builds.
    Version,
    /// Crash reports (minidump plus optional archive).
    Crash,
    /// User feedback items with attachments.
    Feedback,
    /// Debug symbol uploads.
    Symbols,
}

const VERSION_FIELDS: &[BlobField] = &[BlobField {
    field: "file",
    prefix: "build",
}];

const CRASH_FIELDS: &[BlobField] = &[
    BlobField {
        field: "archive",
        prefix: "minidump_archive",
    },
    BlobField {
        field: "minidump",
        prefix: "minidump",
    },
];

const FEEDBACK_FIELDS: &[BlobField] = &[
    BlobField {
        field: "attached_file",
        prefix: "feedback_attach",
    },
    BlobField {
        field: "blackbox",
        prefix: "blackbox",
    },
    BlobField {
        field: "screenshot",
        prefix: "screenshot",
    },
    BlobField {
        field: "system_logs",
        prefix: "system_logs",
    },
];

const SYMBOLS_FIELDS: &[BlobField] = &[BlobField {
    field: "file",
    prefix: "symbols",
}];

impl RecordKind {
    /// Every managed kind, in sweep order.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Version,
        RecordKind::Crash,
        RecordKind::Feedback,
        RecordKind::Symbols,
    ];

    /// Canonical name, used as the preference-key stem.
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Version => "Version",
            RecordKind::Crash => "Crash",
            RecordKind::Feedback => "Feedback",
            RecordKind::Symbols => "Symbols",
        }
    }

    /// Blob-carrying fields for this kind, in catalog declaration order.
    pub fn blob_fields(&self) -> &'static [BlobField] {
        match self {
            RecordKind::Version => VERSION_FIELDS,
            RecordKind::Crash => CRASH_FIELDS,
            RecordKind::Feedback => FEEDBACK_FIELDS,
            RecordKind::Symbols => SYMBOLS_FIELDS,
        }
    }

    /// Key under which the quota monitor publishes this kind's total
    /// size to the fast-read cache.
    pub fn cache_key(&self) -> &'static str {
        match self {
            RecordKind::Version => "versions_size",
            RecordKind::Crash => "crashes_size",
            RecordKind::Feedback => "feedbacks_size",
            RecordKind::Symbols => "symbols_size",
        }
    }

    /// Preference-store key for a per-kind setting,
    /// e.g. `Crash__limit_storage_days`.
    pub fn preference_key(&self, setting: &str) -> String {
        format!("{}__{}", self.name(), setting)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
