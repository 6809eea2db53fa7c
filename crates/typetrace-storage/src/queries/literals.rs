//! string_literals table queries and enum-candidate aggregation.

use rusqlite::{params, Connection};
use typetrace_core::errors::StorageError;

use super::sqlite_err;

/// An aggregated enum candidate: an entity whose string observations
/// cleared the thresholds.
#[derive(Debug, Clone)]
pub struct EnumCandidateRow {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub filename: String,
    pub line_number: Option<i64>,
    pub total_observations: i64,
    pub distinct_strings: i64,
    pub values: Vec<String>,
}

/// Upsert a string literal keyed by `(entity, string_value, context)`.
pub fn upsert_literal(
    conn: &Connection,
    entity_id: i64,
    string_value: &str,
    context: &str,
    now: i64,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO string_literals
               (entity_id, string_value, context, observation_count, first_seen, last_seen)
             VALUES (?1, ?2, ?3, 1, ?4, ?4)
             ON CONFLICT(entity_id, string_value, context) DO UPDATE SET
               observation_count = observation_count + 1,
               last_seen = excluded.last_seen",
        )
        .map_err(sqlite_err)?;
    stmt.execute(params![entity_id, string_value, context, now])
        .map_err(sqlite_err)?;
    Ok(())
}

/// Distinct strings recorded at one entity, most frequent first.
pub fn list_for_entity(conn: &Connection, entity_id: i64) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT DISTINCT string_value FROM string_literals
             WHERE entity_id = ?1
             ORDER BY string_value",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![entity_id], |row| row.get::<_, String>(0))
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Entities with at least `min_observations` string observations and a
/// distinct-string count within `[min_unique, max_unique]`, ordered by
/// total observations descending. The observed strings are fetched per
/// candidate after aggregation.
pub fn enum_candidates(
    conn: &Connection,
    min_observations: i64,
    min_unique: i64,
    max_unique: i64,
    offset: u32,
    limit: u32,
) -> Result<Vec<EnumCandidateRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.entity_id, e.entity_name, e.filename, e.line_number,
                    SUM(s.observation_count) AS total_observations,
                    COUNT(DISTINCT s.string_value) AS distinct_strings
             FROM string_literals s
             JOIN entities e ON e.id = s.entity_id
             GROUP BY s.entity_id
             HAVING total_observations >= ?1
                AND distinct_strings BETWEEN ?2 AND ?3
             ORDER BY total_observations DESC, s.entity_id
             LIMIT ?4 OFFSET ?5",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(
            params![min_observations, min_unique, max_unique, limit, offset],
            |row| {
                Ok(EnumCandidateRow {
                    entity_id: row.get(0)?,
                    entity_name: row.get(1)?,
                    filename: row.get(2)?,
                    line_number: row.get(3)?,
                    total_observations: row.get(4)?,
                    distinct_strings: row.get(5)?,
                    values: Vec::new(),
                })
            },
        )
        .map_err(sqlite_err)?;
    let mut candidates = rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)?;
    for candidate in &mut candidates {
        candidate.values = list_for_entity(conn, candidate.entity_id)?;
    }
    Ok(candidates)
}

/// Total candidate count under the same thresholds.
pub fn count_enum_candidates(
    conn: &Connection,
    min_observations: i64,
    min_unique: i64,
    max_unique: i64,
) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM (
           SELECT s.entity_id
           FROM string_literals s
           GROUP BY s.entity_id
           HAVING SUM(s.observation_count) >= ?1
              AND COUNT(DISTINCT s.string_value) BETWEEN ?2 AND ?3
         )",
        params![min_observations, min_unique, max_unique],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}
