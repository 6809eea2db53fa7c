//! Observation metadata carried by each instrumentation record.

use serde::{Deserialize, Serialize};

/// Whether the dialect annotates a type on the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterTyping {
    Untyped,
    Annotated,
}

/// Declared visibility of a typed constructor parameter-property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Public,
    Private,
    Protected,
}

/// Metadata attached to a `twiz(label, value, offset, filename, metadata)`
/// call. Every field is optional on the wire; unknown keys are ignored on
/// deserialisation. `None` fields are omitted on serialisation so injected
/// metadata literals stay compact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservationMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<ParameterTyping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_destructured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callee_arg_index: Option<u32>,
}

impl ObservationMetadata {
    /// True when this record links a callback parameter to its enclosing
    /// call (both callee fields present).
    pub fn has_hof_link(&self) -> bool {
        self.callee_name.is_some() && self.callee_arg_index.is_some()
    }
}
