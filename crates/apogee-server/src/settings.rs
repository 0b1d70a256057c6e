//! Service settings.
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults;
//! 2. an optional settings file (format taken from its extension);
//! 3. `APOGEE_`-prefixed environment variables, with `__` separating nested
//!    keys, e.g. `APOGEE_AUDIT__QUEUE_CAPACITY=20000`.

use std::collections::HashMap;
use std::path::Path;

use apogee_audit::AuditConfig;
use apogee_sync::DiffCacheConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

const ENV_PREFIX: &str = "APOGEE";

/// Everything the service reads at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default `tracing` filter directive. `RUST_LOG` overrides it.
    pub log_filter: String,

    /// Incremental sync diff cache.
    pub diff_cache: DiffCacheConfig,

    /// Instance audit pipeline.
    pub audit: AuditConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            diff_cache: DiffCacheConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from defaults, `path` and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::build(path, environment())
    }

    /// Like [`load`](Self::load), reading variables from `vars` instead of
    /// the process environment.
    pub fn load_with_env(
        path: Option<&Path>,
        vars: HashMap<String, String>,
    ) -> Result<Self, SettingsError> {
        Self::build(path, environment().source(Some(vars)))
    }

    fn build(path: Option<&Path>, environment: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Self = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.log_filter.trim().is_empty() {
            return Err(SettingsError::Invalid {
                key: "log_filter",
                reason: "must not be empty".to_string(),
            });
        }
        if self.audit.queue_capacity == 0 {
            return Err(SettingsError::Invalid {
                key: "audit.queue_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = Settings::load_with_env(None, HashMap::new()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let settings = Settings::load_with_env(
            None,
            vars(&[
                ("APOGEE_LOG_FILTER", "apogee_audit=debug"),
                ("APOGEE_AUDIT__QUEUE_CAPACITY", "20000"),
                ("APOGEE_AUDIT__FRESHNESS_THRESHOLD", "5m"),
                ("APOGEE_DIFF_CACHE__RECORD_STATS", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.log_filter, "apogee_audit=debug");
        assert_eq!(settings.audit.queue_capacity, 20_000);
        assert_eq!(settings.audit.freshness_threshold, Duration::from_secs(300));
        assert!(settings.diff_cache.record_stats);
        assert_eq!(
            settings.audit.instance_cache_max_size,
            AuditConfig::default().instance_cache_max_size
        );
    }

    #[test]
    fn test_unprefixed_variables_ignored() {
        let settings =
            Settings::load_with_env(None, vars(&[("AUDIT__QUEUE_CAPACITY", "1")])).unwrap();
        assert_eq!(settings.audit.queue_capacity, 10_000);
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let err = Settings::load_with_env(None, vars(&[("APOGEE_AUDIT__QUEUE_CAPACITY", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                key: "audit.queue_capacity",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Settings::load_with_env(
            Some(Path::new("/nonexistent/apogee.toml")),
            HashMap::new(),
        );
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }
}
