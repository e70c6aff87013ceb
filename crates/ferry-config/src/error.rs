//! Configuration error type.

use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`stores.media.connection_string`").
        field: String,
        /// Error message (e.g., "`${S3_SECRET}` not set").
        message: String,
    },
}
