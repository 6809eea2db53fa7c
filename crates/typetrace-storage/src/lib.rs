//! typetrace-storage: the relational store behind the collector.
//!
//! Write-serialized + read-pooled SQLite, versioned migrations, and one
//! query module per table. All upserts key on the natural keys of the data
//! model (entities by `(filename, source_offset)`, observations by
//! `(entity, value_hash, context)`, and so on); repeated ingest increments
//! counters instead of inserting rows.

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::Database;

/// Current unix timestamp in seconds, the store's time base.
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
