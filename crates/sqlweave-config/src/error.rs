//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// JSON parse failure
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse failure
    #[cfg(feature = "toml")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is not usable
    #[error("Invalid configuration for `{field}`: {message}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
