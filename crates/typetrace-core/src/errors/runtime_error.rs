//! Runtime library errors.

use super::error_code::{self, TraceErrorCode};

/// Errors from the in-process runtime library.
///
/// Serialisation failures are absorbed into placeholder strings before they
/// can reach callers; what remains is transport trouble, which the reporter
/// logs and tolerates (loss is acceptable, no retry loop).
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    #[error("no transport configured")]
    NoTransport,
}

impl TraceErrorCode for RuntimeError {
    fn error_code(&self) -> &'static str {
        error_code::TRANSPORT_FAILURE
    }
}
