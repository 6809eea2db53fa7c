//! End-to-end: instrument a source file, simulate the runtime batch a call
//! would produce, ingest it, and query the derived views.

use std::sync::Arc;

use serde_json::json;
use typetrace_collector::ingest::ingest_batch;
use typetrace_collector::query::QueryEngine;
use typetrace_core::config::CollectorConfig;
use typetrace_core::model::{BatchRecord, ObservationMetadata, ValueEntry};
use typetrace_instrument::{InstrumentOptions, Instrumenter};
use typetrace_storage::queries::entities;
use typetrace_storage::Database;

/// Pull every injected `twiz` call back out of instrumented output.
/// Injected metadata is compact JSON without spaces, so `", "` only ever
/// separates the five call arguments.
fn extract_calls(out: &str) -> Vec<(String, String, u64, ObservationMetadata)> {
    let mut calls = Vec::new();
    let mut rest = out;
    while let Some(start) = rest.find("twiz(") {
        let after = &rest[start + 5..];
        let end = after.find(") } catch").expect("well-formed injection");
        let args = &after[..end];
        let parts: Vec<&str> = args.splitn(5, ", ").collect();
        assert_eq!(parts.len(), 5, "five twiz arguments: {args}");
        calls.push((
            parts[0].trim_matches('"').to_string(),
            parts[1].to_string(),
            parts[2].parse().expect("numeric offset"),
            serde_json::from_str(parts[4]).expect("metadata parses"),
        ));
        rest = &after[end..];
    }
    calls
}

#[test]
fn instrumented_function_call_flows_into_the_store() {
    let source = "function f(a,b){ return a+b; }";
    let out = Instrumenter::with_options(InstrumentOptions {
        emit_prelude: false,
        ..InstrumentOptions::default()
    })
    .instrument(source, "test.js")
    .unwrap();

    let calls = extract_calls(&out);
    let labels: Vec<&str> = calls.iter().map(|(label, ..)| label.as_str()).collect();
    assert_eq!(labels, vec!["f_param_a", "f_param_b", "f_entry"]);

    // Simulate the runtime batch for one call f(1, 2).
    let batch: Vec<BatchRecord> = calls
        .into_iter()
        .map(|(label, value_expr, offset, metadata)| {
            let value = match (label.as_str(), value_expr.as_str()) {
                ("f_param_a", _) => json!(1),
                ("f_param_b", _) => json!(2),
                (_, count) => json!(count.parse::<i64>().unwrap()),
            };
            BatchRecord::Positional(
                "test.js".to_string(),
                offset,
                vec![ValueEntry(value, None)],
                metadata,
            )
        })
        .collect();

    let db = Arc::new(Database::open_in_memory().unwrap());
    let summary = ingest_batch(&db, batch).unwrap();
    assert_eq!(summary.records, 3);

    // One entity per label, with the observed number at each parameter.
    db.with_reader(|conn| {
        for (offset, name) in [(0, "f_entry"), (11, "f_param_a"), (13, "f_param_b")] {
            let entity = entities::get_entity(conn, "test.js", offset)?.unwrap();
            assert_eq!(entity.entity_name.as_deref(), Some(name));
        }
        Ok(())
    })
    .unwrap();

    let engine = QueryEngine::new(db.clone(), &CollectorConfig::default());
    let located = engine.location(Some("test.js"), Some(1), Some(11)).unwrap();
    assert_eq!(located.entities.len(), 1);
    assert_eq!(located.entities[0].values[0].value_type, "number");
    assert_eq!(located.entities[0].values[0].literal_value.as_deref(), Some("1"));

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_entities, 3);
}
