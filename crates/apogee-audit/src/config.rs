//! Audit pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the instance audit pipeline.
///
/// Every value is operational tuning; the defaults match what large fleets
/// have run with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum number of reports waiting for the worker.
    pub queue_capacity: usize,

    /// Maximum number of cached instance ids.
    pub instance_cache_max_size: u64,

    /// An instance id is dropped from the cache after this long unused.
    #[serde(with = "humantime_serde")]
    pub instance_cache_idle: Duration,

    /// Maximum number of cached (instance, namespace) release keys.
    pub instance_config_cache_max_size: u64,

    /// A cached release key is dropped this long after it was written.
    #[serde(with = "humantime_serde")]
    pub release_key_ttl: Duration,

    /// A repeated report of the stored release only refreshes the
    /// last-modified time once it is at least this old.
    #[serde(with = "humantime_serde")]
    pub freshness_threshold: Duration,

    /// Record hit/miss statistics for both caches.
    pub record_stats: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
            instance_cache_max_size: 50_000,
            instance_cache_idle: Duration::from_secs(60 * 60),
            instance_config_cache_max_size: 50_000,
            release_key_ttl: Duration::from_secs(24 * 60 * 60),
            freshness_threshold: Duration::from_secs(10 * 60),
            record_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_config_default() {
        let config = AuditConfig::default();
        assert_eq!(config.queue_capacity, 10_000);
        assert_eq!(config.instance_cache_max_size, 50_000);
        assert_eq!(config.instance_cache_idle, Duration::from_secs(3600));
        assert_eq!(config.instance_config_cache_max_size, 50_000);
        assert_eq!(config.release_key_ttl, Duration::from_secs(86_400));
        assert_eq!(config.freshness_threshold, Duration::from_secs(600));
        assert!(!config.record_stats);
    }

    #[test]
    fn test_humantime_durations() {
        let config: AuditConfig = serde_json::from_str(
            r#"{"queue_capacity": 16, "freshness_threshold": "1h 30m", "release_key_ttl": "2days"}"#,
        )
        .unwrap();

        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.freshness_threshold, Duration::from_secs(5400));
        assert_eq!(config.release_key_ttl, Duration::from_secs(172_800));
        assert_eq!(config.instance_cache_idle, Duration::from_secs(3600));
    }
}
