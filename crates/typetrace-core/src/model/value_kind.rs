//! Value kinds and the placeholder conventions shared between the runtime
//! library (which produces surrogates) and the collector (which classifies
//! them).

use serde::{Deserialize, Serialize};

/// Sentinel emitted when the serialiser revisits a reference.
pub const CIRCULAR_SENTINEL: &str = "[Circular Reference]";
/// Prefix for serialiser failures; the reason follows, then `]`.
pub const SERIALISATION_ERROR_PREFIX: &str = "[Serialization Error: ";
/// Placeholder for the host's `undefined`.
pub const UNDEFINED_SENTINEL: &str = "[undefined]";

pub const DATE_PREFIX: &str = "[Date: ";
pub const REGEXP_PREFIX: &str = "[RegExp: ";
pub const FUNCTION_PREFIX: &str = "[Function: ";
pub const ELEMENT_PREFIX: &str = "[HTMLElement: ";
pub const EVENT_PREFIX: &str = "[Event: ";
pub const NODE_LIST_PREFIX: &str = "[NodeList: ";

/// The classified type of one observed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Array,
    Object,
    Date,
    Regexp,
    Function,
    /// Derived host-type tag, e.g. `HTMLElement<DIV>` or `Event<click>`.
    #[serde(untagged)]
    Host(String),
}

impl ValueKind {
    /// Classify a surrogate value. Placeholder strings produced by the
    /// runtime serialiser map back to their host kinds; everything else
    /// classifies by its JSON shape.
    pub fn of_surrogate(value: &serde_json::Value) -> ValueKind {
        match value {
            serde_json::Value::Null => ValueKind::Null,
            serde_json::Value::Bool(_) => ValueKind::Boolean,
            serde_json::Value::Number(_) => ValueKind::Number,
            serde_json::Value::Array(_) => ValueKind::Array,
            serde_json::Value::Object(_) => ValueKind::Object,
            serde_json::Value::String(s) => Self::of_string_surrogate(s),
        }
    }

    fn of_string_surrogate(s: &str) -> ValueKind {
        if s == UNDEFINED_SENTINEL {
            ValueKind::Undefined
        } else if s.starts_with(DATE_PREFIX) {
            ValueKind::Date
        } else if s.starts_with(REGEXP_PREFIX) {
            ValueKind::Regexp
        } else if s.starts_with(FUNCTION_PREFIX) {
            ValueKind::Function
        } else if let Some(tag) = placeholder_payload(s, ELEMENT_PREFIX) {
            ValueKind::Host(format!("HTMLElement<{tag}>"))
        } else if let Some(kind) = placeholder_payload(s, EVENT_PREFIX) {
            ValueKind::Host(format!("Event<{kind}>"))
        } else if s.starts_with(NODE_LIST_PREFIX) {
            ValueKind::Host("NodeList".to_string())
        } else {
            ValueKind::String
        }
    }

    /// The stored `value_type` label.
    pub fn label(&self) -> &str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Null => "null",
            ValueKind::Undefined => "undefined",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Date => "date",
            ValueKind::Regexp => "regexp",
            ValueKind::Function => "function",
            ValueKind::Host(tag) => tag,
        }
    }
}

fn placeholder_payload<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?.strip_suffix(']')
}
