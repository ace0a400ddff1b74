//! Core error types for codescan.
//!
//! Shared types and settings report failures through these enums; the
//! engine and session crates define their own errors on top.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid identifiers, unknown codes)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Settings-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading settings
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid settings value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type alias for settings operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
