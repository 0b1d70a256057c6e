//! Cache metrics recording.

use metrics::{counter, gauge};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Registra las descripciones de las metricas de cache.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_cache_metrics() {
    metrics::describe_counter!("apogee_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("apogee_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "apogee_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!("apogee_cache_entries", "Current number of entries in cache");
}

/// Recorder de metricas para un cache con nombre.
///
/// Cuando las estadisticas estan deshabilitadas todas las operaciones son
/// no-op, asi que los componentes pueden llamarlo sin consultar la config.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    cache: &'static str,
    enabled: bool,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new(cache: &'static str, enabled: bool) -> Self {
        Self {
            cache,
            enabled,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        if !self.enabled {
            return;
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("apogee_cache_hits_total", "cache" => self.cache).increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        if !self.enabled {
            return;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("apogee_cache_misses_total", "cache" => self.cache).increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, reason: &'static str) {
        if !self.enabled {
            return;
        }
        counter!(
            "apogee_cache_evictions_total",
            "cache" => self.cache,
            "reason" => reason
        )
        .increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: u64) {
        if !self.enabled {
            return;
        }
        gauge!("apogee_cache_entries", "cache" => self.cache).set(count as f64);
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics_hit_rate() {
        let metrics = CacheMetrics::new("test", true);

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        let rate = metrics.hit_rate();
        assert!((rate - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_hit_miss_counters() {
        let metrics = CacheMetrics::new("test", true);

        assert_eq!(metrics.hits(), 0);
        assert_eq!(metrics.misses(), 0);

        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        assert_eq!(metrics.hits(), 2);
        assert_eq!(metrics.misses(), 1);
    }

    #[test]
    fn test_disabled_records_nothing() {
        let metrics = CacheMetrics::new("test", false);

        metrics.record_hit();
        metrics.record_miss();
        metrics.record_eviction("size");

        assert!(!metrics.is_enabled());
        assert_eq!(metrics.hits(), 0);
        assert_eq!(metrics.misses(), 0);
        assert_eq!(metrics.hit_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::new("shared", true);
        let clone = metrics.clone();

        clone.record_miss();

        assert_eq!(metrics.misses(), 1);
    }
}
