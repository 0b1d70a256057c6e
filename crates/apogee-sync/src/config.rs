//! Change-diff cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuracion del cache de diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffCacheConfig {
    /// Maximo numero de transiciones memorizadas (default: 1000)
    pub max_capacity: u64,
    /// Tiempo de vida desde la escritura (default: 10 minutos)
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Registrar hits/misses en las metricas
    pub record_stats: bool,
}

impl Default for DiffCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            ttl: Duration::from_secs(10 * 60),
            record_stats: false,
        }
    }
}
