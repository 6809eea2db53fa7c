//! hof_relationships table queries.

use rusqlite::{params, Connection};
use typetrace_core::errors::StorageError;

use super::sqlite_err;

/// A higher-order-function relationship row.
#[derive(Debug, Clone)]
pub struct HofRow {
    pub callback_entity_id: i64,
    pub callee_name: String,
    pub callee_arg_index: i64,
    pub observation_count: i64,
}

/// Upsert keyed by `(callback_entity, callee_name, callee_arg_index)`.
pub fn upsert_relationship(
    conn: &Connection,
    callback_entity_id: i64,
    callee_name: &str,
    callee_arg_index: i64,
    now: i64,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO hof_relationships
               (callback_entity_id, callee_name, callee_arg_index,
                observation_count, first_seen, last_seen)
             VALUES (?1, ?2, ?3, 1, ?4, ?4)
             ON CONFLICT(callback_entity_id, callee_name, callee_arg_index) DO UPDATE SET
               observation_count = observation_count + 1,
               last_seen = excluded.last_seen",
        )
        .map_err(sqlite_err)?;
    stmt.execute(params![callback_entity_id, callee_name, callee_arg_index, now])
        .map_err(sqlite_err)?;
    Ok(())
}

/// Relationships for one callback entity.
pub fn list_for_entity(conn: &Connection, entity_id: i64) -> Result<Vec<HofRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT callback_entity_id, callee_name, callee_arg_index, observation_count
             FROM hof_relationships
             WHERE callback_entity_id = ?1
             ORDER BY callee_name, callee_arg_index",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![entity_id], |row| {
            Ok(HofRow {
                callback_entity_id: row.get(0)?,
                callee_name: row.get(1)?,
                callee_arg_index: row.get(2)?,
                observation_count: row.get(3)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
