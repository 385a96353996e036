//! Error types for statement compilation

use sqlweave_codec::CodecError;
use thiserror::Error;

/// Query error type
#[derive(Error, Debug)]
pub enum QueryError {
    /// Expression names a field the attached schema does not have
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Operand kind is not valid for the operator or function
    #[error("Unsupported operand: {0}")]
    UnsupportedOperand(String),

    /// Statement cannot be rendered as described
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// Argument encoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl QueryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidStatement(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperand(message.into())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
