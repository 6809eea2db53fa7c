//! Safe value serialisation.
//!
//! Produces a JSON-safe surrogate for any host value without throwing:
//! primitives pass through, host kinds become tagged placeholders, cycles
//! become a sentinel via a visited-reference set, and anything else that
//! goes wrong becomes an error placeholder. Oversized composites are
//! replaced by a shallow structural descriptor.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};
use typetrace_core::model::value_kind::{
    CIRCULAR_SENTINEL, DATE_PREFIX, ELEMENT_PREFIX, EVENT_PREFIX, FUNCTION_PREFIX,
    NODE_LIST_PREFIX, REGEXP_PREFIX, SERIALISATION_ERROR_PREFIX, UNDEFINED_SENTINEL,
};

use crate::value::HostValue;

/// Upper bound on one serialised value before the structural-descriptor
/// substitution kicks in.
pub const VALUE_BYTE_CAP: usize = 8192;

/// Build the JSON surrogate for a host value. Never fails; failure modes
/// collapse into placeholder strings.
pub fn surrogate(value: &HostValue) -> Value {
    let mut visited = HashSet::new();
    let built = build(value, &mut visited);
    match serde_json::to_string(&built) {
        Ok(serialised) if serialised.len() > VALUE_BYTE_CAP => structural_descriptor(value),
        Ok(_) => built,
        Err(e) => Value::String(format!("{SERIALISATION_ERROR_PREFIX}{e}]")),
    }
}

/// The serialised surrogate, used as the dedup key.
pub fn safe_stringify(value: &HostValue) -> String {
    serde_json::to_string(&surrogate(value))
        .unwrap_or_else(|e| format!("\"{SERIALISATION_ERROR_PREFIX}{e}]\""))
}

fn build(value: &HostValue, visited: &mut HashSet<usize>) -> Value {
    match value {
        HostValue::Undefined => Value::String(UNDEFINED_SENTINEL.to_string()),
        HostValue::Null => Value::Null,
        HostValue::Bool(b) => Value::Bool(*b),
        // Non-finite numbers have no JSON form; JSON.stringify yields null.
        HostValue::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        HostValue::Str(s) => Value::String(s.clone()),
        HostValue::Date(iso) => Value::String(format!("{DATE_PREFIX}{iso}]")),
        HostValue::Regexp(pattern) => Value::String(format!("{REGEXP_PREFIX}{pattern}]")),
        HostValue::Function(name) => Value::String(format!("{FUNCTION_PREFIX}{name}]")),
        HostValue::Element { tag } => {
            Value::String(format!("{ELEMENT_PREFIX}{}]", tag.to_uppercase()))
        }
        HostValue::Event { kind } => Value::String(format!("{EVENT_PREFIX}{kind}]")),
        HostValue::NodeList { length } => Value::String(format!("{NODE_LIST_PREFIX}{length}]")),
        HostValue::Array(rc) => {
            let ptr = composite_addr(value);
            if !visited.insert(ptr) {
                return Value::String(CIRCULAR_SENTINEL.to_string());
            }
            let items: Vec<Value> =
                rc.borrow().iter().map(|item| build(item, visited)).collect();
            visited.remove(&ptr);
            Value::Array(items)
        }
        HostValue::Object(rc) => {
            let ptr = composite_addr(value);
            if !visited.insert(ptr) {
                return Value::String(CIRCULAR_SENTINEL.to_string());
            }
            let mut map = Map::new();
            for (key, item) in rc.borrow().iter() {
                map.insert(key.clone(), build(item, visited));
            }
            visited.remove(&ptr);
            Value::Object(map)
        }
    }
}

fn composite_addr(value: &HostValue) -> usize {
    value.composite_ptr().unwrap_or(0)
}

/// A shallow summary of element kinds, substituted when a composite's
/// serialised form exceeds the cap.
fn structural_descriptor(value: &HostValue) -> Value {
    match value {
        HostValue::Array(rc) => {
            let items = rc.borrow();
            let kinds: Vec<&str> = items.iter().take(10).map(kind_name).collect();
            Value::String(format!("[Array({}): {}]", items.len(), kinds.join(",")))
        }
        HostValue::Object(rc) => {
            let entries = rc.borrow();
            let keys: Vec<&str> =
                entries.iter().take(10).map(|(key, _)| key.as_str()).collect();
            Value::String(format!("[Object({} keys): {}]", entries.len(), keys.join(",")))
        }
        HostValue::Str(s) => {
            let mut truncated: String = s.chars().take(VALUE_BYTE_CAP / 8).collect();
            truncated.push('…');
            Value::String(truncated)
        }
        other => Value::String(format!("[{}]", kind_name(other))),
    }
}

fn kind_name(value: &HostValue) -> &'static str {
    match value {
        HostValue::Undefined => "undefined",
        HostValue::Null => "null",
        HostValue::Bool(_) => "boolean",
        HostValue::Number(_) => "number",
        HostValue::Str(_) => "string",
        HostValue::Array(_) => "array",
        HostValue::Object(_) => "object",
        HostValue::Date(_) => "date",
        HostValue::Regexp(_) => "regexp",
        HostValue::Function(_) => "function",
        HostValue::Element { .. } => "element",
        HostValue::Event { .. } => "event",
        HostValue::NodeList { .. } => "nodelist",
    }
}
