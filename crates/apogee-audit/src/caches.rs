//! Instance id and release-key caches.

use apogee_core::{CacheMetrics, InstanceIdentity};
use moka::future::Cache;
use moka::notification::RemovalCause;

use crate::config::AuditConfig;
use crate::keys::InstanceConfigKey;

/// The two accelerators in front of instance storage.
///
/// Owned by the auditor and shared with its worker. Only the worker writes;
/// reads from other tasks (diagnostics) are safe.
pub struct AuditCaches {
    instances: Cache<InstanceIdentity, i64>,
    release_keys: Cache<InstanceConfigKey, String>,
    instance_metrics: CacheMetrics,
    release_key_metrics: CacheMetrics,
}

impl AuditCaches {
    pub fn new(config: &AuditConfig) -> Self {
        let instance_metrics = CacheMetrics::new("instance_cache", config.record_stats);
        let release_key_metrics = CacheMetrics::new("instance_config_cache", config.record_stats);

        let eviction_metrics = instance_metrics.clone();
        let instances = Cache::builder()
            .max_capacity(config.instance_cache_max_size)
            .time_to_idle(config.instance_cache_idle)
            .eviction_listener(move |_key, _value, cause| {
                eviction_metrics.record_eviction(eviction_reason(cause));
            })
            .build();

        let eviction_metrics = release_key_metrics.clone();
        let release_keys = Cache::builder()
            .max_capacity(config.instance_config_cache_max_size)
            .time_to_live(config.release_key_ttl)
            .eviction_listener(move |_key, _value, cause| {
                eviction_metrics.record_eviction(eviction_reason(cause));
            })
            .build();

        Self {
            instances,
            release_keys,
            instance_metrics,
            release_key_metrics,
        }
    }

    /// Returns the cached storage id of an instance.
    pub async fn instance_id(&self, identity: &InstanceIdentity) -> Option<i64> {
        let id = self.instances.get(identity).await;
        record(&self.instance_metrics, id.is_some());
        id
    }

    pub async fn put_instance_id(&self, identity: InstanceIdentity, id: i64) {
        self.instances.insert(identity, id).await;
    }

    /// Returns the last release key recorded for the key.
    pub async fn release_key(&self, key: &InstanceConfigKey) -> Option<String> {
        let release_key = self.release_keys.get(key).await;
        record(&self.release_key_metrics, release_key.is_some());
        release_key
    }

    pub async fn put_release_key(&self, key: InstanceConfigKey, release_key: String) {
        self.release_keys.insert(key, release_key).await;
    }

    /// Retorna el numero aproximado de instance ids en cache.
    pub fn instance_count(&self) -> u64 {
        self.instances.entry_count()
    }

    /// Retorna el numero aproximado de release keys en cache.
    pub fn release_key_count(&self) -> u64 {
        self.release_keys.entry_count()
    }

    /// Drops both caches. The worker falls back to storage afterwards.
    pub fn invalidate_all(&self) {
        self.instances.invalidate_all();
        self.release_keys.invalidate_all();
    }

    pub fn instance_metrics(&self) -> &CacheMetrics {
        &self.instance_metrics
    }

    pub fn release_key_metrics(&self) -> &CacheMetrics {
        &self.release_key_metrics
    }

    /// Fuerza el mantenimiento pendiente de ambos caches.
    pub async fn run_pending_tasks(&self) {
        self.instances.run_pending_tasks().await;
        self.release_keys.run_pending_tasks().await;
        self.instance_metrics
            .update_entry_count(self.instances.entry_count());
        self.release_key_metrics
            .update_entry_count(self.release_keys.entry_count());
    }
}

fn record(metrics: &CacheMetrics, hit: bool) {
    if hit {
        metrics.record_hit();
    } else {
        metrics.record_miss();
    }
}

fn eviction_reason(cause: RemovalCause) -> &'static str {
    match cause {
        RemovalCause::Expired => "ttl",
        RemovalCause::Size => "capacity",
        RemovalCause::Explicit => "manual",
        RemovalCause::Replaced => "replaced",
    }
}
