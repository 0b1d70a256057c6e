//! Apogee config service binary.
//!
//! Usage: `apogee-server [SETTINGS_FILE]`

use std::path::PathBuf;
use std::sync::Arc;

use apogee_audit::InMemoryInstanceStore;
use apogee_server::metrics::init_metrics;
use apogee_server::telemetry::init_tracing;
use apogee_server::{ConfigServiceCore, Settings};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref())?;

    init_tracing(&settings.log_filter)?;
    let _prometheus = init_metrics()?;

    info!(
        "Starting Apogee config service v{}",
        env!("CARGO_PKG_VERSION")
    );
    if let Some(path) = &settings_path {
        info!("Settings file: {}", path.display());
    }

    let store = Arc::new(InMemoryInstanceStore::new());
    let core = ConfigServiceCore::bootstrap(&settings, store);

    shutdown_signal().await;
    core.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
