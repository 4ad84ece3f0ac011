//! Error types for the tactical core.
//!
//! Decision paths never fail: a real-time agent must always produce some
//! command. Errors only surface while loading and validating configuration.

use thiserror::Error;

/// Result type alias using [`TacticsError`].
pub type Result<T> = std::result::Result<T, TacticsError>;

/// Top-level error type for the tactical core.
#[derive(Debug, Error)]
pub enum TacticsError {
    /// Config file does not exist.
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Failed to read a config file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),

    /// A configuration value is out of its valid range.
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}
