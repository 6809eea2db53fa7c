//! Query engine errors.

use super::error_code::{self, TraceErrorCode};
use super::StorageError;

/// Errors from the query surface.
///
/// `MissingParameter` maps to HTTP 400; everything else to HTTP 500.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("missing required parameter: {name}")]
    MissingParameter { name: &'static str },

    #[error("query invalid: {reason}")]
    Invalid { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TraceErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => error_code::PARAMETER_MISSING,
            Self::Invalid { .. } => error_code::QUERY_INVALID,
            Self::Storage(_) => error_code::STORAGE_ERROR,
        }
    }
}
