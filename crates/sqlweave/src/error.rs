//! Error types for the engine façade

use sqlweave_codec::CodecError;
use sqlweave_config::ConfigError;
use sqlweave_query::QueryError;
use sqlweave_reflect::ReflectError;
use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded or validated
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No dialect is registered for the configured driver
    #[error("Unknown driver: {0}")]
    UnknownDriver(String),

    /// Statement compilation failed
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Encoding or decoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A dynamic value did not fit a record
    #[error("Reflect error: {0}")]
    Reflect(#[from] ReflectError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
