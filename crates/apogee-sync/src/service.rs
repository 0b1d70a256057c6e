//! Memoized change sets using Moka.

use std::sync::Arc;

use apogee_core::{CacheMetrics, ChangeSet, ConfigurationMap, ReleaseKeyPair};
use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::debug;

use crate::config::DiffCacheConfig;
use crate::diff::calc_configuration_changes;

/// Computes the change set a polling client needs.
///
/// The request layer holds this as `Arc<dyn IncrementalSyncService>` so the
/// memoizing implementation can be swapped for a pass-through one in tests
/// or when incremental sync is disabled.
pub trait IncrementalSyncService: Send + Sync {
    /// Returns the changes between the client's release and the latest
    /// merged release.
    ///
    /// Missing configuration maps are treated as empty. This never fails.
    fn get_configuration_changes(
        &self,
        latest_merged_release_key: &str,
        latest_release_configurations: Option<&ConfigurationMap>,
        client_side_release_key: &str,
        client_side_configurations: Option<&ConfigurationMap>,
    ) -> ChangeSet;
}

/// Cache de change sets por transicion de release.
/// Thread-safe; no requiere locking externo.
///
/// A hit returns the very `Arc` stored on the first computation, so callers
/// can compare results with [`Arc::ptr_eq`]. The cached value is a snapshot:
/// once a transition is memoized, later calls for the same pair get the
/// stored diff whatever maps they pass.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use apogee_sync::{ChangeDiffCache, DiffCacheConfig};
///
/// let cache = ChangeDiffCache::new(DiffCacheConfig::default());
///
/// let first = cache.get_changes("latest", None, "client", None);
/// let second = cache.get_changes("latest", None, "client", None);
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Clone)]
pub struct ChangeDiffCache {
    inner: Cache<ReleaseKeyPair, ChangeSet>,
    metrics: CacheMetrics,
}

impl ChangeDiffCache {
    /// Crea un nuevo cache con la configuracion dada.
    pub fn new(config: DiffCacheConfig) -> Self {
        let metrics = CacheMetrics::new("configuration_change_cache", config.record_stats);

        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .eviction_listener(move |_key, _value, cause| {
                eviction_metrics.record_eviction(eviction_reason(cause));
            })
            .build();

        Self { inner, metrics }
    }

    /// Returns the memoized change set for the transition, computing and
    /// storing it on a miss.
    ///
    /// Concurrent misses for the same pair compute the diff once; every
    /// caller receives the same `Arc`.
    pub fn get_changes(
        &self,
        latest_merged_release_key: &str,
        latest_release_configurations: Option<&ConfigurationMap>,
        client_side_release_key: &str,
        client_side_configurations: Option<&ConfigurationMap>,
    ) -> ChangeSet {
        let key = ReleaseKeyPair::new(client_side_release_key, latest_merged_release_key);

        if let Some(cached) = self.inner.get(&key) {
            self.metrics.record_hit();
            return cached;
        }

        self.metrics.record_miss();

        let entry = self.inner.entry(key).or_insert_with(|| {
            Arc::new(calc_configuration_changes(
                latest_release_configurations,
                client_side_configurations,
            ))
        });

        if entry.is_fresh() {
            debug!(
                client_release_key = %entry.key().client_release_key(),
                latest_release_key = %entry.key().latest_merged_release_key(),
                changes = entry.value().len(),
                "Computed configuration changes"
            );
            self.metrics.update_entry_count(self.inner.entry_count());
        }

        entry.into_value()
    }

    /// Returns the memoized change set without computing one.
    pub fn get_cached(&self, key: &ReleaseKeyPair) -> Option<ChangeSet> {
        self.inner.get(key)
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Invalida todas las entradas.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Fuerza el mantenimiento pendiente (expiracion, conteo de entries).
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

impl Default for ChangeDiffCache {
    fn default() -> Self {
        Self::new(DiffCacheConfig::default())
    }
}

impl IncrementalSyncService for ChangeDiffCache {
    fn get_configuration_changes(
        &self,
        latest_merged_release_key: &str,
        latest_release_configurations: Option<&ConfigurationMap>,
        client_side_release_key: &str,
        client_side_configurations: Option<&ConfigurationMap>,
    ) -> ChangeSet {
        self.get_changes(
            latest_merged_release_key,
            latest_release_configurations,
            client_side_release_key,
            client_side_configurations,
        )
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
