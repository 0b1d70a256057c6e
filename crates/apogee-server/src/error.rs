//! Startup errors.

use thiserror::Error;

/// Settings could not be loaded.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or the merged values did not deserialize.
    #[error("invalid settings: {0}")]
    Config(#[from] config::ConfigError),

    /// A value deserialized but is unusable.
    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors raised while bringing the service up.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install tracing subscriber: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_setting_display() {
        let err = SettingsError::Invalid {
            key: "log_filter",
            reason: "must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid setting 'log_filter': must not be empty"
        );
    }

    #[test]
    fn test_settings_error_is_transparent() {
        let err = ServerError::from(SettingsError::Invalid {
            key: "log_filter",
            reason: "empty".to_string(),
        });
        assert_eq!(err.to_string(), "invalid setting 'log_filter': empty");
    }
}
