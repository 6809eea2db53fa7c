//! Bounded ad-hoc query channel.
//!
//! A single statement with parameter binding, executed read-or-write on the
//! caller's connection. Multi-statement input is rejected by rusqlite's
//! prepare; no SQL is parsed here.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Number, Value};
use typetrace_core::errors::StorageError;

use super::sqlite_err;

/// Execute one statement with the given JSON parameters and return the
/// result rows as JSON objects keyed by column name. Statements that
/// return no rows yield an empty vector.
pub fn run_query(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> Result<Vec<Map<String, Value>>, StorageError> {
    let mut stmt = conn.prepare(sql).map_err(sqlite_err)?;
    let column_names: Vec<String> =
        stmt.column_names().iter().map(|name| name.to_string()).collect();

    for (i, param) in params.iter().enumerate() {
        stmt.raw_bind_parameter(i + 1, json_to_sql(param))
            .map_err(sqlite_err)?;
    }

    let mut rows = stmt.raw_query();
    let mut result = Vec::new();
    while let Some(row) = rows.next().map_err(sqlite_err)? {
        let mut object = Map::new();
        for (i, name) in column_names.iter().enumerate() {
            let value = row.get_ref(i).map_err(sqlite_err)?;
            object.insert(name.clone(), sql_to_json(value));
        }
        result.push(object);
    }
    Ok(result)
}

fn json_to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Sql::Integer(i)
            } else {
                Sql::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Sql::Text(s.clone()),
        // Composite parameters bind as their JSON text.
        other => Sql::Text(other.to_string()),
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(
            b.iter().map(|byte| format!("{byte:02x}")).collect::<String>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use serde_json::json;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn single_statement_with_binding() {
        let conn = setup_db();
        let rows = run_query(&conn, "SELECT ?1 AS a, ?2 AS b", &[json!(1), json!("x")]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], json!(1));
        assert_eq!(rows[0]["b"], json!("x"));
    }

    #[test]
    fn multi_statement_rejected() {
        let conn = setup_db();
        let err = run_query(&conn, "SELECT 1; SELECT 2", &[]);
        assert!(err.is_err());
    }

    #[test]
    fn invalid_sql_rejected() {
        let conn = setup_db();
        assert!(run_query(&conn, "SELEC wrong", &[]).is_err());
    }
}
