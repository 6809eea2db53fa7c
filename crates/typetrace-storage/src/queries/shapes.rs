//! object_shapes table queries.

use rusqlite::{params, Connection};
use typetrace_core::errors::StorageError;

use super::sqlite_err;

/// A shape row joined with its entity.
#[derive(Debug, Clone)]
pub struct ShapeRow {
    pub id: i64,
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub filename: String,
    pub shape_signature: String,
    pub observation_count: i64,
    pub first_seen: i64,
    pub last_seen: i64,
}

/// Upsert a shape keyed by `(entity, shape_signature)`.
pub fn upsert_shape(
    conn: &Connection,
    entity_id: i64,
    shape_signature: &str,
    now: i64,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO object_shapes
               (entity_id, shape_signature, observation_count, first_seen, last_seen)
             VALUES (?1, ?2, 1, ?3, ?3)
             ON CONFLICT(entity_id, shape_signature) DO UPDATE SET
               observation_count = observation_count + 1,
               last_seen = excluded.last_seen",
        )
        .map_err(sqlite_err)?;
    stmt.execute(params![entity_id, shape_signature, now])
        .map_err(sqlite_err)?;
    Ok(())
}

/// Shapes with at least `min_observations`, most observed first.
pub fn list_shapes(
    conn: &Connection,
    min_observations: i64,
    offset: u32,
    limit: u32,
) -> Result<Vec<ShapeRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.id, s.entity_id, e.entity_name, e.filename, s.shape_signature,
                    s.observation_count, s.first_seen, s.last_seen
             FROM object_shapes s
             JOIN entities e ON e.id = s.entity_id
             WHERE s.observation_count >= ?1
             ORDER BY s.observation_count DESC, s.id
             LIMIT ?2 OFFSET ?3",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![min_observations, limit, offset], |row| {
            Ok(ShapeRow {
                id: row.get(0)?,
                entity_id: row.get(1)?,
                entity_name: row.get(2)?,
                filename: row.get(3)?,
                shape_signature: row.get(4)?,
                observation_count: row.get(5)?,
                first_seen: row.get(6)?,
                last_seen: row.get(7)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Shape count above the observation threshold.
pub fn count_shapes(conn: &Connection, min_observations: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM object_shapes WHERE observation_count >= ?1",
        params![min_observations],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}
