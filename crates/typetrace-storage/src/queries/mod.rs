//! One query module per table, plus aggregate stats and the bounded
//! ad-hoc query channel.

pub mod adhoc;
pub mod entities;
pub mod hof;
pub mod literals;
pub mod observations;
pub mod shapes;
pub mod stats;

use typetrace_core::errors::StorageError;

pub(crate) fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError { message: e.to_string() }
}

/// Escape LIKE wildcards in a user-supplied substring filter and wrap it
/// in `%...%`.
pub(crate) fn like_contains(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
