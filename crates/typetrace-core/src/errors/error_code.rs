//! Stable error codes for diagnostics and log correlation.

pub const SOURCE_UNPARSEABLE: &str = "TT1001";
pub const NODE_SKIPPED: &str = "TT1002";
pub const SERIALISATION_FAILURE: &str = "TT2001";
pub const TRANSPORT_FAILURE: &str = "TT2002";
pub const BATCH_MALFORMED: &str = "TT3001";
pub const BATCH_ABORTED: &str = "TT3002";
pub const STORAGE_ERROR: &str = "TT4001";
pub const MIGRATION_FAILED: &str = "TT4002";
pub const QUERY_INVALID: &str = "TT5001";
pub const PARAMETER_MISSING: &str = "TT5002";
pub const CONFIG_ERROR: &str = "TT6001";

/// Every subsystem error exposes a stable machine-readable code.
pub trait TraceErrorCode {
    fn error_code(&self) -> &'static str;
}
