//! Error types for the codec layer

use thiserror::Error;

/// Codec error type
#[derive(Error, Debug)]
pub enum CodecError {
    /// No encoder or decoder registered for the type or its kind
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Value does not fit the destination width or precision
    #[error("Value {value} overflows {target}")]
    Overflow { value: String, target: String },

    /// Negative value headed into an unsigned destination
    #[error("Negative value {value} for unsigned {target}")]
    InvalidSign { value: String, target: String },

    /// Token stream violates the wire grammar
    #[error("Malformed input at byte {position}: {message}")]
    MalformedInput { position: usize, message: String },

    /// Dynamic value does not match the declared type
    #[error("Value mismatch for {ty}: found {found}")]
    ValueMismatch { ty: String, found: String },

    /// Invalid base64 payload
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid timestamp text
    #[error("Timestamp error: {0}")]
    Time(#[from] chrono::ParseError),

    /// Typed record conversion failed
    #[error("Record error: {0}")]
    Reflect(#[from] sqlweave_reflect::ReflectError),
}

impl CodecError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn mismatch(ty: &sqlweave_reflect::Type, found: impl Into<String>) -> Self {
        Self::ValueMismatch {
            ty: ty.id().to_string(),
            found: found.into(),
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
