//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// The match-reason thresholds are not ordered `good < high` within (0, 1].
    #[error("invalid score thresholds: good={good}, high={high} (need 0 < good < high <= 1)")]
    InvalidThresholds { good: f32, high: f32 },

    /// A numeric setting was set to a value the service cannot use.
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
