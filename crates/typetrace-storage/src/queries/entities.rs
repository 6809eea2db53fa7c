//! entities table queries.

use rusqlite::{params, Connection};
use typetrace_core::errors::StorageError;

use super::{like_contains, sqlite_err};

/// An entity row.
#[derive(Debug, Clone)]
pub struct EntityRow {
    pub id: i64,
    pub filename: String,
    pub source_offset: i64,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub line_number: Option<i64>,
    pub column_number: Option<i64>,
    pub observation_count: i64,
    pub first_seen: i64,
    pub last_seen: i64,
}

/// An entity row joined with its value-observation count.
#[derive(Debug, Clone)]
pub struct EntityWithValues {
    pub entity: EntityRow,
    pub value_count: i64,
}

/// Insert `(filename, source_offset)` or, on conflict, increment the
/// observation counter and refresh `last_seen`. Returns the entity id.
pub fn upsert_entity(
    conn: &Connection,
    filename: &str,
    source_offset: i64,
    now: i64,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO entities (filename, source_offset, observation_count, first_seen, last_seen)
             VALUES (?1, ?2, 1, ?3, ?3)
             ON CONFLICT(filename, source_offset) DO UPDATE SET
               observation_count = observation_count + 1,
               last_seen = excluded.last_seen
             RETURNING id",
        )
        .map_err(sqlite_err)?;
    stmt.query_row(params![filename, source_offset, now], |row| row.get(0))
        .map_err(sqlite_err)
}

/// Update an entity's descriptive metadata. `None` means "leave the prior
/// value intact".
pub fn update_entity_metadata(
    conn: &Connection,
    entity_id: i64,
    entity_name: Option<&str>,
    entity_type: Option<&str>,
    line_number: Option<i64>,
    column_number: Option<i64>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE entities SET
           entity_name = COALESCE(?2, entity_name),
           entity_type = COALESCE(?3, entity_type),
           line_number = COALESCE(?4, line_number),
           column_number = COALESCE(?5, column_number)
         WHERE id = ?1",
        params![entity_id, entity_name, entity_type, line_number, column_number],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Fetch one entity by its natural key.
pub fn get_entity(
    conn: &Connection,
    filename: &str,
    source_offset: i64,
) -> Result<Option<EntityRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("{ENTITY_SELECT} WHERE filename = ?1 AND source_offset = ?2"))
        .map_err(sqlite_err)?;
    let mut rows = stmt
        .query_map(params![filename, source_offset], map_entity_row)
        .map_err(sqlite_err)?;
    rows.next().transpose().map_err(sqlite_err)
}

/// List entities with their value counts, most recently seen first,
/// optionally filtered by a filename substring.
pub fn list_entities(
    conn: &Connection,
    filename_contains: Option<&str>,
    offset: u32,
    limit: u32,
) -> Result<Vec<EntityWithValues>, StorageError> {
    let filter = filename_contains.map(like_contains);
    let sql = format!(
        "SELECT e.id, e.filename, e.source_offset, e.entity_name, e.entity_type,
                e.line_number, e.column_number, e.observation_count, e.first_seen, e.last_seen,
                (SELECT COUNT(*) FROM value_observations v WHERE v.entity_id = e.id) AS value_count
         FROM entities e
         {}
         ORDER BY e.last_seen DESC, e.id DESC
         LIMIT ?1 OFFSET ?2",
        if filter.is_some() { "WHERE e.filename LIKE ?3 ESCAPE '\\'" } else { "" }
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;

    let map = |row: &rusqlite::Row| -> rusqlite::Result<EntityWithValues> {
        Ok(EntityWithValues { entity: map_entity_row(row)?, value_count: row.get(10)? })
    };
    let rows = match &filter {
        Some(f) => stmt.query_map(params![limit, offset, f], map).map_err(sqlite_err)?,
        None => stmt.query_map(params![limit, offset], map).map_err(sqlite_err)?,
    };
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Total entity count under the same optional filename filter.
pub fn count_entities(
    conn: &Connection,
    filename_contains: Option<&str>,
) -> Result<i64, StorageError> {
    match filename_contains {
        Some(needle) => conn
            .query_row(
                "SELECT COUNT(*) FROM entities WHERE filename LIKE ?1 ESCAPE '\\'",
                params![like_contains(needle)],
                |row| row.get(0),
            )
            .map_err(sqlite_err),
        None => conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .map_err(sqlite_err),
    }
}

/// All entities at a source location. Column matching applies only when a
/// column is supplied.
pub fn find_by_location(
    conn: &Connection,
    filename: &str,
    line_number: i64,
    column_number: Option<i64>,
) -> Result<Vec<EntityRow>, StorageError> {
    let sql = format!(
        "{ENTITY_SELECT} WHERE filename = ?1 AND line_number = ?2 {} ORDER BY source_offset",
        if column_number.is_some() { "AND column_number = ?3" } else { "" }
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = match column_number {
        Some(col) => stmt
            .query_map(params![filename, line_number, col], map_entity_row)
            .map_err(sqlite_err)?,
        None => stmt
            .query_map(params![filename, line_number], map_entity_row)
            .map_err(sqlite_err)?,
    };
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

const ENTITY_SELECT: &str =
    "SELECT id, filename, source_offset, entity_name, entity_type, line_number,
            column_number, observation_count, first_seen, last_seen
     FROM entities";

fn map_entity_row(row: &rusqlite::Row) -> rusqlite::Result<EntityRow> {
    Ok(EntityRow {
        id: row.get(0)?,
        filename: row.get(1)?,
        source_offset: row.get(2)?,
        entity_name: row.get(3)?,
        entity_type: row.get(4)?,
        line_number: row.get(5)?,
        column_number: row.get(6)?,
        observation_count: row.get(7)?,
        first_seen: row.get(8)?,
        last_seen: row.get(9)?,
    })
}
