//! Apogee Server - wiring for the Apogee config service
//!
//! Loads [`Settings`], installs logging and the metrics recorder, and builds
//! the shared [`ConfigServiceCore`] the request layer serves from.

pub mod error;
pub mod metrics;
pub mod settings;
pub mod state;
pub mod telemetry;

pub use error::{ServerError, SettingsError};
pub use settings::Settings;
pub use state::ConfigServiceCore;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
