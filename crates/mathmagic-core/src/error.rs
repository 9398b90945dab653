//! Core error types for mathmagic-core.
//!
//! Gameplay itself never fails: bad input is an incorrect answer and a
//! missing narration signal is covered by fallback timers. These errors
//! cover the things that can go wrong around the game, mostly loading
//! and validating configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mathmagic-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(String),

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A duration that must be positive was zero
    #[error("Invalid duration for '{field}': must be greater than zero")]
    ZeroDuration { field: String },

    /// Value outside its permitted range
    #[error("Value {value} out of range for '{field}' (expected {min}..={max})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SerializeFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_wraps_into_core_error() {
        let err: CoreError = ConfigError::UnknownKey("recall.nope".into()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown configuration key: recall.nope"
        );
    }

    #[test]
    fn out_of_range_message_lists_bounds() {
        let err = ValidationError::OutOfRange {
            field: "recall.hard_probability".into(),
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("0..=1"));
    }
}
