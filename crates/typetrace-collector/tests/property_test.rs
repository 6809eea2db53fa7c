//! Property tests for the ingest filters and classification helpers.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use typetrace_collector::ingest::classify::{capped_literal, value_hash};
use typetrace_collector::ingest::filters::{is_enum_candidate, shape_signature};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn shape_signature_invariant_under_key_order(
        keys in proptest::collection::btree_set("[a-z]{1,8}", 1..15)
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let forward: Map<String, Value> =
            keys.iter().map(|k| (k.clone(), json!(1))).collect();
        let mut reversed = Map::new();
        for k in keys.iter().rev() {
            reversed.insert(k.clone(), json!(1));
        }
        prop_assert_eq!(shape_signature(&forward), shape_signature(&reversed));
    }

    #[test]
    fn shape_signature_lists_every_key(
        keys in proptest::collection::btree_set("[a-z]{1,8}", 1..15)
    ) {
        let object: Map<String, Value> =
            keys.iter().map(|k| (k.clone(), json!(true))).collect();
        let signature = shape_signature(&object).unwrap();
        prop_assert_eq!(signature.split(',').count(), keys.len());
        for key in &keys {
            let needle = format!("{}:boolean", key);
            prop_assert!(signature.contains(&needle));
        }
    }

    #[test]
    fn value_hash_is_eight_lowercase_hex_chars(input in ".*") {
        let hash = value_hash(&input);
        prop_assert_eq!(hash.len(), 8);
        prop_assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn value_hash_is_deterministic(input in ".*") {
        prop_assert_eq!(value_hash(&input), value_hash(&input));
    }

    #[test]
    fn capped_array_literal_never_exceeds_ten_elements(
        items in proptest::collection::vec(0i64..1000, 0..40)
    ) {
        let literal = capped_literal(&json!(items));
        let parsed: Vec<i64> = serde_json::from_str(&literal).unwrap();
        prop_assert!(parsed.len() <= 10);
    }

    #[test]
    fn capped_object_literal_never_exceeds_the_byte_cap(
        entries in proptest::collection::btree_map("[a-z]{1,10}", "[a-zA-Z0-9 ]{0,60}", 0..60)
    ) {
        let object: Map<String, Value> =
            entries.into_iter().map(|(k, v)| (k, json!(v))).collect();
        let literal = capped_literal(&Value::Object(object));
        prop_assert!(literal.len() <= 1000);
    }

    #[test]
    fn long_strings_never_qualify_as_enum_candidates(s in ".{51,80}") {
        prop_assert!(!is_enum_candidate(&s));
    }

    #[test]
    fn digit_strings_never_qualify(s in "[0-9]{1,20}") {
        prop_assert!(!is_enum_candidate(&s));
    }
}
