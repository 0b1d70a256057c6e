//! Logging setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ServerError;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set and valid. Fails if a
/// global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
