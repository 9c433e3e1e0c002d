//! Janitor configuration.
//!
//! Loaded from `janitor.toml` with `JANITOR__`-prefixed environment
//! overrides layered on top of serde defaults, so the binary runs
//! configless against an in-memory store.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Object store DSN: `memory://`, `file:///path`, or
    /// `s3://[key:secret@]host[:port]/bucket`.
    pub dsn: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dsn: String::from("memory://"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// Object storage configuration.
    pub storage: StorageConfig,

    /// Timeout applied to every individual object-store call.
    ///
    /// Env: JANITOR__STORE_OP_TIMEOUT
    #[serde(with = "humantime_serde", default = "default_store_op_timeout")]
    pub store_op_timeout: Duration,

    /// Retention limits, keyed like the preference store
    /// (`Crash__duplicate_number`, `Version__limit_size`, ...).
    /// Size limits are in GiB, age limits in days.
    #[serde(default)]
    pub preferences: HashMap<String, u64>,
}

fn default_store_op_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            store_op_timeout: default_store_op_timeout(),
            preferences: HashMap::new(),
        }
    }
}

impl JanitorConfig {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(JanitorConfig::default()))
            .merge(Toml::file("janitor.toml"))
            .merge(Env::prefixed("JANITOR__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(JanitorConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("JANITOR__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configless_defaults() {
        let config = Figment::from(Serialized::defaults(JanitorConfig::default()))
            .extract::<JanitorConfig>()
            .unwrap();

        assert_eq!(config.storage.dsn, "memory://");
        assert_eq!(config.store_op_timeout, Duration::from_secs(30));
        assert!(config.preferences.is_empty());
    }

    #[test]
    fn test_toml_preferences_table() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "janitor.toml",
                r#"
                    store_op_timeout = "10s"

                    [storage]
                    dsn = "file:///var/lib/janitor"

                    [preferences]
                    Crash__duplicate_number = 20
                    Crash__limit_size = 10
                "#,
            )?;

            let config = JanitorConfig::load().unwrap();
            assert_eq!(config.storage.dsn, "file:///var/lib/janitor");
            assert_eq!(config.store_op_timeout, Duration::from_secs(10));
            assert_eq!(config.preferences.get("Crash__duplicate_number"), Some(&20));
            assert_eq!(config.preferences.get("Crash__limit_size"), Some(&10));
            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("JANITOR__STORAGE__DSN", "memory://");
            jail.set_env("JANITOR__STORE_OP_TIMEOUT", "5s");

            let config = JanitorConfig::load().unwrap();
            assert_eq!(config.storage.dsn, "memory://");
            assert_eq!(config.store_op_timeout, Duration::from_secs(5));
            Ok(())
        });
    }
}
