//! Fast-read size cache capability.
//!
//! The quota monitor publishes per-collection sizes here for
//! dashboard display. This core only writes; the read path belongs to
//! the UI.

use std::collections::HashMap;
use std::sync::Mutex;

/// Write-only view of the dashboard cache.
pub trait SizeCache: Send + Sync {
    fn set(&self, key: &str, value: u64);
}

/// Cache backed by a mutex-guarded map, for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemorySizeCache {
    values: Mutex<HashMap<String, u64>>,
}

impl InMemorySizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.values
            .lock()
            .expect("size cache lock poisoned")
            .get(key)
            .copied()
    }
}

impl SizeCache for InMemorySizeCache {
    fn set(&self, key: &str, value: u64) {
        self.values
            .lock()
            .expect("size cache lock poisoned")
            .insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let cache = InMemorySizeCache::new();
        cache.set("crashes_size", 100);
        cache.set("crashes_size", 250);
        assert_eq!(cache.get("crashes_size"), Some(250));
        assert_eq!(cache.get("versions_size"), None);
    }
}
