//! Wire batch format: what runtimes POST to the collector ingest endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::ObservationMetadata;

/// Origin of a tracked composite value: `(filename, offset)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance(pub String, pub u64);

/// One observed value plus its provenance, serialised as a two-element
/// array `[value, provenance_or_null]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry(pub Value, pub Option<Provenance>);

/// One record of a batch. The collector accepts both the positional
/// 4-tuple form and the equivalent keyed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchRecord {
    Positional(String, u64, Vec<ValueEntry>, ObservationMetadata),
    Keyed {
        filename: String,
        offset: u64,
        #[serde(default)]
        values: Vec<ValueEntry>,
        #[serde(default)]
        metadata: ObservationMetadata,
    },
}

impl BatchRecord {
    /// Flatten either form into `(filename, offset, values, metadata)`.
    pub fn into_parts(self) -> (String, u64, Vec<ValueEntry>, ObservationMetadata) {
        match self {
            Self::Positional(filename, offset, values, metadata) => {
                (filename, offset, values, metadata)
            }
            Self::Keyed { filename, offset, values, metadata } => {
                (filename, offset, values, metadata)
            }
        }
    }
}
