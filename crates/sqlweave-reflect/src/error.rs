//! Error types for typed record conversion

use thiserror::Error;

/// Record conversion error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReflectError {
    /// A dynamic value has the wrong shape for the Rust target
    #[error("Value mismatch: expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A struct value has fewer slots than the record declares
    #[error("Missing struct slot {0}")]
    MissingField(usize),

    /// A numeric value does not fit the Rust target
    #[error("Value {value} out of range for {target}")]
    OutOfRange { value: String, target: &'static str },
}

/// Result type for record conversion
pub type ReflectResult<T> = Result<T, ReflectError>;
