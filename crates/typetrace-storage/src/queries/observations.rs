//! value_observations table queries.

use rusqlite::{params, Connection};
use typetrace_core::errors::StorageError;

use super::{like_contains, sqlite_err};

/// A value observation row.
#[derive(Debug, Clone)]
pub struct ValueObservationRow {
    pub id: i64,
    pub entity_id: i64,
    pub value_type: String,
    pub literal_value: Option<String>,
    pub value_hash: String,
    pub context: String,
    pub observation_count: i64,
    pub first_seen: i64,
    pub last_seen: i64,
}

/// A `(entity, value_type, literal_value)` row for the function-calls view.
#[derive(Debug, Clone)]
pub struct CallRow {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub filename: String,
    pub line_number: Option<i64>,
    pub value_type: String,
    pub literal_value: Option<String>,
    pub context: String,
    pub observation_count: i64,
    pub last_seen: i64,
}

/// Upsert an observation keyed by `(entity, value_hash, context)`.
/// A duplicate increments the counter instead of inserting.
pub fn upsert_observation(
    conn: &Connection,
    entity_id: i64,
    value_type: &str,
    literal_value: &str,
    value_hash: &str,
    context: &str,
    now: i64,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO value_observations
               (entity_id, value_type, literal_value, value_hash, context,
                observation_count, first_seen, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
             ON CONFLICT(entity_id, value_hash, context) DO UPDATE SET
               observation_count = observation_count + 1,
               last_seen = excluded.last_seen",
        )
        .map_err(sqlite_err)?;
    stmt.execute(params![entity_id, value_type, literal_value, value_hash, context, now])
        .map_err(sqlite_err)?;
    Ok(())
}

/// All observations recorded at one entity.
pub fn list_for_entity(
    conn: &Connection,
    entity_id: i64,
) -> Result<Vec<ValueObservationRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, entity_id, value_type, literal_value, value_hash, context,
                    observation_count, first_seen, last_seen
             FROM value_observations
             WHERE entity_id = ?1
             ORDER BY observation_count DESC, id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![entity_id], map_observation_row)
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// The function-calls view: one row per `(entity, value_type,
/// literal_value)`, ordered by recency then call count. Optional filename
/// and function-name substring filters; the latter matches the entity name
/// or the enriched observation context.
pub fn list_calls(
    conn: &Connection,
    filepath_contains: Option<&str>,
    function_contains: Option<&str>,
    offset: u32,
    limit: u32,
) -> Result<Vec<CallRow>, StorageError> {
    let (where_clause, file_filter, fn_filter) =
        calls_filter(filepath_contains, function_contains, 3);
    let sql = format!(
        "SELECT v.entity_id, e.entity_name, e.entity_type, e.filename, e.line_number,
                v.value_type, v.literal_value, v.context, v.observation_count, v.last_seen
         FROM value_observations v
         JOIN entities e ON e.id = v.entity_id
         {where_clause}
         ORDER BY v.last_seen DESC, v.observation_count DESC, v.id DESC
         LIMIT ?1 OFFSET ?2"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let map = |row: &rusqlite::Row| -> rusqlite::Result<CallRow> {
        Ok(CallRow {
            entity_id: row.get(0)?,
            entity_name: row.get(1)?,
            entity_type: row.get(2)?,
            filename: row.get(3)?,
            line_number: row.get(4)?,
            value_type: row.get(5)?,
            literal_value: row.get(6)?,
            context: row.get(7)?,
            observation_count: row.get(8)?,
            last_seen: row.get(9)?,
        })
    };
    let rows = match (&file_filter, &fn_filter) {
        (Some(f), Some(g)) => stmt
            .query_map(params![limit, offset, f, g], map)
            .map_err(sqlite_err)?,
        (Some(f), None) => stmt.query_map(params![limit, offset, f], map).map_err(sqlite_err)?,
        (None, Some(g)) => stmt.query_map(params![limit, offset, g], map).map_err(sqlite_err)?,
        (None, None) => stmt.query_map(params![limit, offset], map).map_err(sqlite_err)?,
    };
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Total row count for the function-calls view under the same filters.
pub fn count_calls(
    conn: &Connection,
    filepath_contains: Option<&str>,
    function_contains: Option<&str>,
) -> Result<i64, StorageError> {
    let (where_clause, file_filter, fn_filter) =
        calls_filter(filepath_contains, function_contains, 1);
    let sql = format!(
        "SELECT COUNT(*)
         FROM value_observations v
         JOIN entities e ON e.id = v.entity_id
         {where_clause}"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let count = match (&file_filter, &fn_filter) {
        (Some(f), Some(g)) => stmt.query_row(params![f, g], |row| row.get(0)),
        (Some(f), None) => stmt.query_row(params![f], |row| row.get(0)),
        (None, Some(g)) => stmt.query_row(params![g], |row| row.get(0)),
        (None, None) => stmt.query_row([], |row| row.get(0)),
    };
    count.map_err(sqlite_err)
}

/// Build the WHERE clause for the calls view. `first_param` is the index of
/// the first filter placeholder (list_calls reserves ?1/?2 for
/// LIMIT/OFFSET, count_calls starts at ?1).
fn calls_filter(
    filepath_contains: Option<&str>,
    function_contains: Option<&str>,
    first_param: u32,
) -> (String, Option<String>, Option<String>) {
    let file_filter = filepath_contains.map(like_contains);
    let fn_filter = function_contains.map(like_contains);
    let mut clauses = Vec::new();
    let mut next = first_param;
    if file_filter.is_some() {
        clauses.push(format!("e.filename LIKE ?{next} ESCAPE '\\'"));
        next += 1;
    }
    if fn_filter.is_some() {
        clauses.push(format!(
            "(e.entity_name LIKE ?{next} ESCAPE '\\' OR v.context LIKE ?{next} ESCAPE '\\')"
        ));
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (where_clause, file_filter, fn_filter)
}

/// Per-entity aggregate used to classify annotation candidates.
#[derive(Debug, Clone)]
pub struct AnnotationRollup {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub filename: String,
    pub line_number: Option<i64>,
    pub value_types: Vec<String>,
    pub distinct_strings: i64,
    pub distinct_numbers: i64,
    pub total_observations: i64,
}

/// One rollup row per entity that has value observations: the distinct
/// value types seen, distinct string/number value counts, and the total
/// observation count.
pub fn annotation_rollups(conn: &Connection) -> Result<Vec<AnnotationRollup>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT v.entity_id, e.entity_name, e.entity_type, e.filename, e.line_number,
                    GROUP_CONCAT(DISTINCT v.value_type) AS value_types,
                    COUNT(DISTINCT CASE WHEN v.value_type = 'string' THEN v.value_hash END),
                    COUNT(DISTINCT CASE WHEN v.value_type = 'number' THEN v.value_hash END),
                    SUM(v.observation_count)
             FROM value_observations v
             JOIN entities e ON e.id = v.entity_id
             GROUP BY v.entity_id
             ORDER BY v.entity_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            let types: String = row.get(5)?;
            Ok(AnnotationRollup {
                entity_id: row.get(0)?,
                entity_name: row.get(1)?,
                entity_type: row.get(2)?,
                filename: row.get(3)?,
                line_number: row.get(4)?,
                value_types: types.split(',').map(str::to_string).collect(),
                distinct_strings: row.get(6)?,
                distinct_numbers: row.get(7)?,
                total_observations: row.get(8)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

fn map_observation_row(row: &rusqlite::Row) -> rusqlite::Result<ValueObservationRow> {
    Ok(ValueObservationRow {
        id: row.get(0)?,
        entity_id: row.get(1)?,
        value_type: row.get(2)?,
        literal_value: row.get(3)?,
        value_hash: row.get(4)?,
        context: row.get(5)?,
        observation_count: row.get(6)?,
        first_seen: row.get(7)?,
        last_seen: row.get(8)?,
    })
}
