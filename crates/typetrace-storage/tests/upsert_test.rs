//! Upsert semantics: natural keys, counter increments, last_seen refresh.

use rusqlite::Connection;
use typetrace_storage::migrations::run_migrations;
use typetrace_storage::queries::{entities, hof, literals, observations, shapes, stats};

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

#[test]
fn entity_upsert_increments_counter() {
    let conn = setup_db();
    let id1 = entities::upsert_entity(&conn, "src/todo.ts", 120, 1700000000).unwrap();
    let id2 = entities::upsert_entity(&conn, "src/todo.ts", 120, 1700000050).unwrap();
    assert_eq!(id1, id2);

    let row = entities::get_entity(&conn, "src/todo.ts", 120).unwrap().unwrap();
    assert_eq!(row.observation_count, 2);
    assert_eq!(row.first_seen, 1700000000);
    assert_eq!(row.last_seen, 1700000050);
}

#[test]
fn distinct_offsets_create_distinct_entities() {
    let conn = setup_db();
    let a = entities::upsert_entity(&conn, "src/todo.ts", 120, 1).unwrap();
    let b = entities::upsert_entity(&conn, "src/todo.ts", 121, 1).unwrap();
    let c = entities::upsert_entity(&conn, "src/other.ts", 120, 1).unwrap();
    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_eq!(entities::count_entities(&conn, None).unwrap(), 3);
}

#[test]
fn metadata_update_treats_null_as_keep() {
    let conn = setup_db();
    let id = entities::upsert_entity(&conn, "src/todo.ts", 120, 1).unwrap();
    entities::update_entity_metadata(
        &conn,
        id,
        Some("addTodo_param_todo"),
        Some("function_declaration_parameter"),
        Some(12),
        Some(24),
    )
    .unwrap();
    // A later record without position info must not clobber what we have.
    entities::update_entity_metadata(&conn, id, None, None, None, None).unwrap();

    let row = entities::get_entity(&conn, "src/todo.ts", 120).unwrap().unwrap();
    assert_eq!(row.entity_name.as_deref(), Some("addTodo_param_todo"));
    assert_eq!(row.line_number, Some(12));
    assert_eq!(row.column_number, Some(24));
}

#[test]
fn observation_upsert_dedupes_by_hash_and_context() {
    let conn = setup_db();
    let id = entities::upsert_entity(&conn, "a.ts", 0, 1).unwrap();

    for ts in [10, 20] {
        observations::upsert_observation(
            &conn, id, "string", "\"success\"", "260ca9dd", "parameter_in_setStatus", ts,
        )
        .unwrap();
    }
    // Same hash under a different context is a separate row.
    observations::upsert_observation(
        &conn, id, "string", "\"success\"", "260ca9dd", "parameter", 30,
    )
    .unwrap();

    let rows = observations::list_for_entity(&conn, id).unwrap();
    assert_eq!(rows.len(), 2);
    let dup = rows
        .iter()
        .find(|r| r.context == "parameter_in_setStatus")
        .unwrap();
    assert_eq!(dup.observation_count, 2);
    assert_eq!(dup.last_seen, 20);
}

#[test]
fn literal_and_shape_upserts_count() {
    let conn = setup_db();
    let id = entities::upsert_entity(&conn, "a.ts", 0, 1).unwrap();

    for _ in 0..4 {
        literals::upsert_literal(&conn, id, "success", "parameter_in_setStatus", 5).unwrap();
    }
    for _ in 0..3 {
        shapes::upsert_shape(&conn, id, "done:boolean,id:string", 5).unwrap();
    }

    let values = literals::list_for_entity(&conn, id).unwrap();
    assert_eq!(values, vec!["success".to_string()]);

    let shape_rows = shapes::list_shapes(&conn, 1, 0, 10).unwrap();
    assert_eq!(shape_rows.len(), 1);
    assert_eq!(shape_rows[0].shape_signature, "done:boolean,id:string");
    assert_eq!(shape_rows[0].observation_count, 3);
}

#[test]
fn hof_upsert_unique_per_callee_and_index() {
    let conn = setup_db();
    let id = entities::upsert_entity(&conn, "a.ts", 40, 1).unwrap();

    hof::upsert_relationship(&conn, id, "createRoutine", 1, 1).unwrap();
    hof::upsert_relationship(&conn, id, "createRoutine", 1, 2).unwrap();
    hof::upsert_relationship(&conn, id, "items.map", 0, 3).unwrap();

    let rows = hof::list_for_entity(&conn, id).unwrap();
    assert_eq!(rows.len(), 2);
    let routine = rows.iter().find(|r| r.callee_name == "createRoutine").unwrap();
    assert_eq!(routine.observation_count, 2);
    assert_eq!(routine.callee_arg_index, 1);
}

#[test]
fn stats_reflect_ingested_rows() {
    let conn = setup_db();
    let a = entities::upsert_entity(&conn, "a.ts", 0, 1).unwrap();
    let b = entities::upsert_entity(&conn, "b.ts", 0, 1).unwrap();
    observations::upsert_observation(&conn, a, "number", "1", "c4ca4238", "p", 1).unwrap();
    observations::upsert_observation(&conn, a, "number", "1", "c4ca4238", "p", 2).unwrap();
    observations::upsert_observation(&conn, b, "string", "\"x\"", "aabbccdd", "p", 3).unwrap();

    let stats = stats::store_stats(&conn).unwrap();
    assert_eq!(stats.total_entities, 2);
    assert_eq!(stats.distinct_files, 2);
    assert_eq!(stats.distinct_value_rows, 2);
    assert_eq!(stats.total_observations, 3);
    assert_eq!(stats.type_distribution[0], ("number".to_string(), 2));
}

#[test]
fn enum_candidate_thresholds() {
    let conn = setup_db();
    let id = entities::upsert_entity(&conn, "status.ts", 0, 1).unwrap();
    for value in ["pending", "running", "done"] {
        for ts in 0..5 {
            literals::upsert_literal(&conn, id, value, "parameter", ts).unwrap();
        }
    }
    // A second entity with a single distinct string never qualifies.
    let single = entities::upsert_entity(&conn, "status.ts", 9, 1).unwrap();
    for ts in 0..9 {
        literals::upsert_literal(&conn, single, "only", "parameter", ts).unwrap();
    }

    let candidates = literals::enum_candidates(&conn, 3, 2, 20, 0, 50).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].entity_id, id);
    assert_eq!(candidates[0].distinct_strings, 3);
    assert_eq!(candidates[0].total_observations, 15);
    assert_eq!(candidates[0].values, vec!["done", "pending", "running"]);

    assert_eq!(literals::count_enum_candidates(&conn, 3, 2, 20).unwrap(), 1);
}

#[test]
fn calls_view_filters_and_orders() {
    let conn = setup_db();
    let a = entities::upsert_entity(&conn, "src/api.ts", 0, 1).unwrap();
    entities::update_entity_metadata(&conn, a, Some("fetchUser_param_id"), None, None, None)
        .unwrap();
    let b = entities::upsert_entity(&conn, "src/ui.ts", 0, 1).unwrap();
    entities::update_entity_metadata(&conn, b, Some("render_param_el"), None, None, None).unwrap();

    observations::upsert_observation(&conn, a, "string", "\"u1\"", "11111111", "p", 10).unwrap();
    observations::upsert_observation(&conn, b, "string", "\"x\"", "22222222", "p", 20).unwrap();

    let all = observations::list_calls(&conn, None, None, 0, 50).unwrap();
    assert_eq!(all.len(), 2);
    // Recency first.
    assert_eq!(all[0].filename, "src/ui.ts");

    let api_only = observations::list_calls(&conn, Some("api"), None, 0, 50).unwrap();
    assert_eq!(api_only.len(), 1);
    assert_eq!(api_only[0].entity_name.as_deref(), Some("fetchUser_param_id"));

    let by_fn = observations::list_calls(&conn, None, Some("render"), 0, 50).unwrap();
    assert_eq!(by_fn.len(), 1);
    assert_eq!(observations::count_calls(&conn, None, Some("render")).unwrap(), 1);
}

#[test]
fn location_lookup_with_optional_column() {
    let conn = setup_db();
    let id = entities::upsert_entity(&conn, "src/todo.ts", 120, 1).unwrap();
    entities::update_entity_metadata(&conn, id, Some("addTodo_param_todo"), None, Some(12), Some(24))
        .unwrap();
    let other = entities::upsert_entity(&conn, "src/todo.ts", 140, 1).unwrap();
    entities::update_entity_metadata(&conn, other, None, None, Some(12), Some(31)).unwrap();

    let by_line = entities::find_by_location(&conn, "src/todo.ts", 12, None).unwrap();
    assert_eq!(by_line.len(), 2);

    let by_col = entities::find_by_location(&conn, "src/todo.ts", 12, Some(24)).unwrap();
    assert_eq!(by_col.len(), 1);
    assert_eq!(by_col[0].entity_name.as_deref(), Some("addTodo_param_todo"));

    assert!(entities::find_by_location(&conn, "src/todo.ts", 99, None)
        .unwrap()
        .is_empty());
}
