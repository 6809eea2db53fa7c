//! Instrumenter errors.

use super::error_code::{self, TraceErrorCode};

/// Errors from the AST instrumenter.
///
/// `SourceUnparseable` is the only fatal case: the caller must fall back to
/// the original source verbatim. Per-node failures never surface here; they
/// are skipped in place.
#[derive(Debug, thiserror::Error)]
pub enum InstrumentError {
    #[error("source could not be parsed: {filename}: {reason}")]
    SourceUnparseable { filename: String, reason: String },

    #[error("unsupported dialect for {filename}")]
    UnsupportedDialect { filename: String },
}

impl TraceErrorCode for InstrumentError {
    fn error_code(&self) -> &'static str {
        error_code::SOURCE_UNPARSEABLE
    }
}
