//! Value classification: literal caps, content hashing, context
//! enrichment, and entity-name derivation.

use md5::{Digest, Md5};
use serde_json::Value;
use typetrace_core::model::ObservationMetadata;

/// Byte cap on a serialised object literal.
pub const OBJECT_LITERAL_CAP: usize = 1000;
/// Element cap on a serialised array literal.
pub const ARRAY_ELEMENT_CAP: usize = 10;

/// The stored literal form of a surrogate: JSON serialisation with
/// objects capped at 1000 bytes and arrays at 10 elements.
pub fn capped_literal(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let capped: Vec<&Value> = items.iter().take(ARRAY_ELEMENT_CAP).collect();
            serde_json::to_string(&capped).unwrap_or_else(|_| "[]".to_string())
        }
        Value::Object(_) => {
            let serialised =
                serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
            truncate_on_char_boundary(serialised, OBJECT_LITERAL_CAP)
        }
        other => serde_json::to_string(other).unwrap_or_else(|_| "null".to_string()),
    }
}

fn truncate_on_char_boundary(mut s: String, cap: usize) -> String {
    if s.len() <= cap {
        return s;
    }
    let mut end = cap;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
    s
}

/// First 8 hex characters of the MD5 digest over the literal.
pub fn value_hash(literal: &str) -> String {
    let digest = Md5::digest(literal.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// The enriched observation context: `<entity_context>_in_<functionName>`
/// when the enclosing function is known, else the bare entity context.
pub fn enriched_context(metadata: &ObservationMetadata) -> String {
    let base = metadata.context.as_deref().unwrap_or("unknown");
    match metadata.function_name.as_deref() {
        Some(function) => format!("{base}_in_{function}"),
        None => base.to_string(),
    }
}

/// Derive the stable entity label from record metadata. Entry records are
/// `<fn>_entry`; constructor parameters keep the `constructor_param_<p>`
/// pattern; other parameters are `<fn>_param_<p>`.
pub fn derive_entity_name(metadata: &ObservationMetadata) -> Option<String> {
    let function = metadata.function_name.as_deref()?;
    Some(match (metadata.parameter_name.as_deref(), metadata.context.as_deref()) {
        (_, Some("function_entry")) => format!("{function}_entry"),
        (Some(param), Some("constructor_parameter")) => format!("constructor_param_{param}"),
        (Some(param), _) => format!("{function}_param_{param}"),
        (None, _) => function.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_literals_are_plain_json() {
        assert_eq!(capped_literal(&json!(1)), "1");
        assert_eq!(capped_literal(&json!("success")), "\"success\"");
        assert_eq!(capped_literal(&json!(true)), "true");
        assert_eq!(capped_literal(&json!(null)), "null");
    }

    #[test]
    fn arrays_cap_at_ten_elements() {
        let value = json!([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(capped_literal(&value), "[0,1,2,3,4,5,6,7,8,9]");
    }

    #[test]
    fn objects_cap_at_a_thousand_bytes() {
        let mut map = serde_json::Map::new();
        for i in 0..100 {
            map.insert(format!("key_number_{i}"), json!("some padding value here"));
        }
        let literal = capped_literal(&Value::Object(map));
        assert!(literal.len() <= 1000);
    }

    #[test]
    fn object_cap_respects_char_boundaries() {
        let mut map = serde_json::Map::new();
        map.insert("k".to_string(), json!("é".repeat(600)));
        let literal = capped_literal(&Value::Object(map));
        assert!(literal.len() <= 1000);
        // Must not split a multi-byte character.
        assert!(literal.is_char_boundary(literal.len()));
    }

    #[test]
    fn hash_is_first_eight_md5_hex_chars() {
        // md5("success") = 260ca9dd8a4577fc00b7bd5810298076
        assert_eq!(value_hash("success"), "260ca9dd");
        // md5("1") = c4ca4238a0b923820dcc509a6f75849b
        assert_eq!(value_hash("1"), "c4ca4238");
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        assert_eq!(value_hash("\"success\""), value_hash("\"success\""));
        assert_ne!(value_hash("\"success\""), value_hash("\"failure\""));
        assert_eq!(value_hash("whatever").len(), 8);
    }

    #[test]
    fn context_enrichment() {
        let with_fn = ObservationMetadata {
            context: Some("parameter".into()),
            function_name: Some("setStatus".into()),
            ..Default::default()
        };
        assert_eq!(enriched_context(&with_fn), "parameter_in_setStatus");

        let bare = ObservationMetadata {
            context: Some("parameter".into()),
            ..Default::default()
        };
        assert_eq!(enriched_context(&bare), "parameter");
    }

    #[test]
    fn entity_name_derivation() {
        let entry = ObservationMetadata {
            function_name: Some("f".into()),
            context: Some("function_entry".into()),
            ..Default::default()
        };
        assert_eq!(derive_entity_name(&entry).as_deref(), Some("f_entry"));

        let param = ObservationMetadata {
            function_name: Some("addTodo".into()),
            parameter_name: Some("todo".into()),
            context: Some("function_declaration_parameter".into()),
            ..Default::default()
        };
        assert_eq!(derive_entity_name(&param).as_deref(), Some("addTodo_param_todo"));

        let ctor = ObservationMetadata {
            function_name: Some("TodoStore".into()),
            parameter_name: Some("backend".into()),
            context: Some("constructor_parameter".into()),
            ..Default::default()
        };
        assert_eq!(derive_entity_name(&ctor).as_deref(), Some("constructor_param_backend"));

        assert_eq!(derive_entity_name(&ObservationMetadata::default()), None);
    }
}
