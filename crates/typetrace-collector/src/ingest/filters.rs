//! Enum-candidate and object-shape filters.

use serde_json::{Map, Value};
use typetrace_core::model::value_kind::{CIRCULAR_SENTINEL, SERIALISATION_ERROR_PREFIX};

/// Whether a string is plausibly enum-like: length 1–50, at most 3
/// whitespace-separated tokens, no path or URL markers, not purely
/// numeric. Serialiser sentinels never qualify.
pub fn is_enum_candidate(s: &str) -> bool {
    let len = s.chars().count();
    if len == 0 || len > 50 {
        return false;
    }
    if s.split_whitespace().count() > 3 {
        return false;
    }
    if s.contains('/') || s.contains('\\') || s.contains("http") {
        return false;
    }
    if s.parse::<f64>().is_ok() {
        return false;
    }
    if s == CIRCULAR_SENTINEL || s.starts_with(SERIALISATION_ERROR_PREFIX) {
        return false;
    }
    true
}

/// Canonical shape signature of a non-array object with 1–20 own keys:
/// keys sorted lexicographically, each annotated with its JSON type,
/// joined by commas.
pub fn shape_signature(object: &Map<String, Value>) -> Option<String> {
    if object.is_empty() || object.len() > 20 {
        return None;
    }
    let mut keys: Vec<&String> = object.keys().collect();
    keys.sort();
    let signature = keys
        .iter()
        .map(|key| format!("{key}:{}", json_type_name(&object[key.as_str()])))
        .collect::<Vec<_>>()
        .join(",");
    Some(signature)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
