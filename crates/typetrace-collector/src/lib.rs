//! typetrace-collector: consumes observation batches and serves the
//! analytical query surface.
//!
//! Ingest applies each batch as one immediate transaction against the
//! store; the query engine reads committed state only; the axum server
//! wires both to the HTTP endpoints.

pub mod ingest;
pub mod query;
pub mod server;

pub use ingest::ingest_batch;
pub use query::QueryEngine;
pub use server::{router, AppState};
