//! Shared model types: entity contexts, observation metadata, value kinds,
//! and the wire batch format.

pub mod context;
pub mod metadata;
pub mod value_kind;
pub mod wire;

pub use context::EntityContext;
pub use metadata::{Accessibility, ObservationMetadata, ParameterTyping};
pub use value_kind::ValueKind;
pub use wire::{BatchRecord, Provenance, ValueEntry};
