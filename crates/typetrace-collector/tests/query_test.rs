//! Query engine: derived views, pagination envelopes, heuristics.

use std::sync::Arc;

use serde_json::json;
use typetrace_collector::ingest::{ingest_batch, parse_batch};
use typetrace_collector::query::QueryEngine;
use typetrace_core::config::CollectorConfig;
use typetrace_core::errors::QueryError;
use typetrace_storage::Database;

fn setup() -> (Arc<Database>, QueryEngine) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let engine = QueryEngine::new(db.clone(), &CollectorConfig::default());
    (db, engine)
}

fn ingest(db: &Database, body: serde_json::Value) {
    ingest_batch(db, parse_batch(&body).unwrap()).unwrap();
}

#[test]
fn stats_views_counts_and_distribution() {
    let (db, engine) = setup();
    ingest(
        &db,
        json!([
            ["a.ts", 1, [[1, null], ["x", null]], {"functionName": "f"}],
            ["b.ts", 2, [[true, null]], {"functionName": "g"}]
        ]),
    );

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_entities, 2);
    assert_eq!(stats.distinct_files, 2);
    assert_eq!(stats.total_value_rows, 3);
    assert_eq!(stats.total_observations, 3);
    let types: Vec<&str> =
        stats.type_distribution.iter().map(|t| t.value_type.as_str()).collect();
    assert!(types.contains(&"number"));
    assert!(types.contains(&"string"));
    assert!(types.contains(&"boolean"));
}

#[test]
fn entities_paginate_and_filter_by_filename() {
    let (db, engine) = setup();
    for i in 0..7 {
        ingest(
            &db,
            json!([[format!("src/mod_{i}.ts"), 1, [[i, null]], {"functionName": "f"}]]),
        );
    }

    let page = engine.entities(None, Some(0), Some(5)).unwrap();
    assert_eq!(page.entities.len(), 5);
    assert_eq!(page.pagination.total, 7);
    assert!(page.pagination.has_more);

    let rest = engine.entities(None, Some(5), Some(5)).unwrap();
    assert_eq!(rest.entities.len(), 2);
    assert!(!rest.pagination.has_more);

    let filtered = engine.entities(Some("mod_3"), None, None).unwrap();
    assert_eq!(filtered.entities.len(), 1);
    assert_eq!(filtered.pagination.total, 1);
    assert_eq!(filtered.entities[0].entity.filename, "src/mod_3.ts");
    assert_eq!(filtered.entities[0].value_count, 1);
}

#[test]
fn calls_view_filters_by_function_name() {
    let (db, engine) = setup();
    ingest(
        &db,
        json!([
            ["src/api.ts", 1, [["u1", null]],
             {"functionName": "fetchUser", "parameterName": "id", "context": "function_declaration_parameter"}],
            ["src/ui.ts", 2, [[{"w": 1}, null]],
             {"functionName": "render", "parameterName": "el", "context": "function_declaration_parameter"}]
        ]),
    );

    let all = engine.calls(None, None, None, None).unwrap();
    assert_eq!(all.calls.len(), 2);
    assert_eq!(all.pagination.limit, 50, "default page size");

    let by_fn = engine.calls(None, Some("fetchUser"), None, None).unwrap();
    assert_eq!(by_fn.calls.len(), 1);
    assert_eq!(by_fn.calls[0].entity_name.as_deref(), Some("fetchUser_param_id"));

    let by_path = engine.calls(Some("ui"), None, None, None).unwrap();
    assert_eq!(by_path.calls.len(), 1);
    assert_eq!(by_path.calls[0].value_type, "object");
}

#[test]
fn location_requires_filename_and_line() {
    let (db, engine) = setup();
    ingest(
        &db,
        json!([["src/todo.ts", 120, [["x", null]],
                {"functionName": "addTodo", "parameterName": "todo",
                 "context": "function_declaration_parameter",
                 "lineNumber": 12, "columnNumber": 24}]]),
    );

    let err = engine.location(None, Some(12), None).unwrap_err();
    assert!(matches!(err, QueryError::MissingParameter { name: "filename" }));
    let err = engine.location(Some("src/todo.ts"), None, None).unwrap_err();
    assert!(matches!(err, QueryError::MissingParameter { name: "line_number" }));

    let found = engine.location(Some("src/todo.ts"), Some(12), None).unwrap();
    assert_eq!(found.entities.len(), 1);
    assert_eq!(found.entities[0].entity.entity_name.as_deref(), Some("addTodo_param_todo"));
    assert_eq!(found.entities[0].values.len(), 1);
    assert_eq!(found.entities[0].values[0].value_type, "string");

    let wrong_column = engine.location(Some("src/todo.ts"), Some(12), Some(99)).unwrap();
    assert!(wrong_column.entities.is_empty());
}

#[test]
fn enum_candidates_with_suggested_names() {
    // Scenario: "pending"/"running"/"done" seen five times each.
    let (db, engine) = setup();
    for _ in 0..5 {
        for value in ["pending", "running", "done"] {
            ingest(
                &db,
                json!([["src/status.ts", 11, [[value, null]],
                        {"functionName": "setStatus", "parameterName": "status",
                         "context": "parameter"}]]),
            );
        }
    }

    let response = engine.enums(Some(3), Some(2), None, None).unwrap();
    assert_eq!(response.candidates.len(), 1);
    let candidate = &response.candidates[0];
    assert_eq!(candidate.distinct_strings, 3);
    assert_eq!(candidate.total_observations, 15);
    assert_eq!(candidate.values, vec!["done", "pending", "running"]);
    assert!(candidate.suggested_name.starts_with("Status"), "{}", candidate.suggested_name);

    // Raising the observation floor above the totals empties the view.
    let strict = engine.enums(Some(100), Some(2), None, None).unwrap();
    assert!(strict.candidates.is_empty());
    assert_eq!(strict.pagination.total, 0);
}

#[test]
fn shapes_view_synthesises_declarations() {
    let (db, engine) = setup();
    for id in ["a", "b", "c"] {
        ingest(
            &db,
            json!([["src/todo.ts", 40, [[{"id": id, "done": false}, null]],
                    {"functionName": "addTodo", "parameterName": "todo",
                     "context": "function_declaration_parameter"}]]),
        );
    }

    let response = engine.shapes(Some(3), None, None).unwrap();
    assert_eq!(response.shapes.len(), 1);
    let shape = &response.shapes[0];
    assert_eq!(shape.shape_signature, "done:boolean,id:string");
    assert_eq!(shape.observation_count, 3);
    assert_eq!(
        shape.type_declaration,
        "interface Todo {\n  done: boolean;\n  id: string;\n}"
    );
}

#[test]
fn annotations_classify_and_rank() {
    let (db, engine) = setup();
    // Enum-ish: one entity seeing three distinct strings.
    for value in ["a", "b", "c"] {
        ingest(
            &db,
            json!([["e.ts", 1, [[value, null]], {"functionName": "pickKind", "parameterName": "kind"}]]),
        );
    }
    // Interface-ish: objects.
    ingest(
        &db,
        json!([["i.ts", 1, [[{"x": 1}, null]], {"functionName": "draw", "parameterName": "point"}]]),
    );
    // Union-ish: mixed types.
    ingest(
        &db,
        json!([["u.ts", 1, [[1, null], ["one", null]], {"functionName": "parse", "parameterName": "raw"}]]),
    );
    // Simple: a lone boolean.
    ingest(
        &db,
        json!([["s.ts", 1, [[true, null]], {"functionName": "toggle", "parameterName": "on"}]]),
    );

    let response = engine.annotations(None, None).unwrap();
    assert_eq!(response.annotations.len(), 4);
    let kinds: Vec<String> = response
        .annotations
        .iter()
        .map(|a| serde_json::to_value(a.kind).unwrap().as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["enum", "interface", "union", "simple"]);

    let enum_row = &response.annotations[0];
    assert_eq!(enum_row.entity_name.as_deref(), Some("pickKind_param_kind"));
    assert_eq!(enum_row.total_observations, 3);
}

#[test]
fn adhoc_single_statement_with_params() {
    let (db, engine) = setup();
    ingest(&db, json!([["a.ts", 1, [[1, null]], {"functionName": "f"}]]));

    let rows = engine
        .adhoc("SELECT filename, observation_count FROM entities WHERE filename = ?1", &[json!("a.ts")])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["filename"], json!("a.ts"));
    assert_eq!(rows[0]["observation_count"], json!(1));
}

#[test]
fn adhoc_rejects_multi_statement_and_garbage() {
    let (_db, engine) = setup();
    assert!(matches!(
        engine.adhoc("SELECT 1; DROP TABLE entities", &[]),
        Err(QueryError::Invalid { .. })
    ));
    assert!(matches!(
        engine.adhoc("NOT EVEN SQL", &[]),
        Err(QueryError::Invalid { .. })
    ));
    assert!(matches!(
        engine.adhoc("   ", &[]),
        Err(QueryError::MissingParameter { .. })
    ));
}

#[test]
fn limits_are_clamped_to_the_configured_maximum() {
    let (db, engine) = setup();
    ingest(&db, json!([["a.ts", 1, [[1, null]], {"functionName": "f"}]]));

    let response = engine.entities(None, None, Some(1_000_000)).unwrap();
    assert_eq!(response.pagination.limit, 500);
}
