//! Collector ingest errors.

use super::error_code::{self, TraceErrorCode};
use super::StorageError;

/// Errors from the batch ingest pipeline.
///
/// `MalformedBatch` maps to HTTP 400 (batch dropped); `Storage` maps to
/// HTTP 500 (the whole batch transaction rolled back).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed batch: {reason}")]
    MalformedBatch { reason: String },

    #[error("batch transaction aborted: {0}")]
    Storage(#[from] StorageError),
}

impl TraceErrorCode for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedBatch { .. } => error_code::BATCH_MALFORMED,
            Self::Storage(_) => error_code::BATCH_ABORTED,
        }
    }
}
