//! typetrace-core: shared foundation for the typetrace pipeline.
//!
//! - Model: entity contexts, observation metadata, value kinds
//! - Wire: the batch format POSTed by runtimes to the collector
//! - Config: TOML-based layered configuration
//! - Errors: one enum per subsystem, `thiserror` only

pub mod config;
pub mod errors;
pub mod model;

pub use config::{CollectorConfig, InstrumentConfig, RuntimeConfig, TypetraceConfig};
pub use errors::{
    ConfigError, IngestError, InstrumentError, QueryError, RuntimeError, StorageError,
    TraceErrorCode,
};
pub use model::{
    Accessibility, BatchRecord, EntityContext, ObservationMetadata, ParameterTyping, Provenance,
    ValueEntry, ValueKind,
};
