//! Metrics setup and initialization.

use apogee_audit::register_audit_metrics;
use apogee_core::metrics::register_cache_metrics;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::ServerError;

/// Inicializa el sistema de metricas y retorna el handle para el endpoint.
///
/// El handle renderiza el formato de texto de Prometheus; servirlo por HTTP
/// queda a cargo de la capa de requests.
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_cache_metrics();
    register_audit_metrics();

    info!("Metrics system initialized");
    Ok(handle)
}
