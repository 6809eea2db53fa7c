//! Aggregate counts over the whole store.

use rusqlite::Connection;
use typetrace_core::errors::StorageError;

use super::sqlite_err;

/// Store-wide aggregate counts.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub total_entities: i64,
    pub total_observations: i64,
    pub distinct_value_rows: i64,
    pub distinct_files: i64,
    /// `value_type` -> total observation count.
    pub type_distribution: Vec<(String, i64)>,
}

/// Collect the stats view in one read snapshot.
pub fn store_stats(conn: &Connection) -> Result<StoreStats, StorageError> {
    let total_entities: i64 = conn
        .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
        .map_err(sqlite_err)?;
    let distinct_files: i64 = conn
        .query_row("SELECT COUNT(DISTINCT filename) FROM entities", [], |row| row.get(0))
        .map_err(sqlite_err)?;
    let (distinct_value_rows, total_observations): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), COALESCE(SUM(observation_count), 0) FROM value_observations",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(sqlite_err)?;

    let mut stmt = conn
        .prepare_cached(
            "SELECT value_type, SUM(observation_count)
             FROM value_observations
             GROUP BY value_type
             ORDER BY SUM(observation_count) DESC, value_type",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(sqlite_err)?;
    let type_distribution = rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)?;

    Ok(StoreStats {
        total_entities,
        total_observations,
        distinct_value_rows,
        distinct_files,
        type_distribution,
    })
}
