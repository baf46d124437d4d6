#![cfg(feature = "sqlite")]

//! Relational-table ingestion (SQLite).

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Load a whole table (`SELECT *`) from a SQLite database file.
///
/// The database is opened read-only, so a missing file is reported as unavailable rather than
/// silently created.
pub fn ingest_table_from_path(database: impl AsRef<Path>, table: &str) -> IngestionResult<DataSet> {
    let database = database.as_ref();
    let location = format!("{}#{table}", database.display());
    let conn = Connection::open_with_flags(database, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| IngestionError::unavailable(&location, e))?;
    ingest_table(&conn, table, &location)
}

/// Load a whole table from an open connection.
///
/// `location` names the source in errors.
pub fn ingest_table(conn: &Connection, table: &str, location: &str) -> IngestionResult<DataSet> {
    let sql = format!("SELECT * FROM {}", quote_identifier(table));
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| IngestionError::unavailable(location, e))?;

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    if names.is_empty() {
        return Err(IngestionError::SchemaEmpty {
            location: location.to_owned(),
        });
    }

    let width = names.len();
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut cursor = stmt
        .query([])
        .map_err(|e| IngestionError::unavailable(location, e))?;
    while let Some(row) = cursor
        .next()
        .map_err(|e| IngestionError::unavailable(location, e))?
    {
        let mut out = Vec::with_capacity(width);
        for idx in 0..width {
            let cell = row
                .get_ref(idx)
                .map_err(|e| IngestionError::unavailable(location, e))?;
            out.push(convert_value_ref(cell));
        }
        rows.push(out);
    }

    let fields = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| Field::new(name, DataType::infer(rows.iter().filter_map(|r| r.get(idx)))))
        .collect();

    Ok(DataSet::new(Schema::new(fields), rows))
}

fn convert_value_ref(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(bytes) => Value::Utf8(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Quote a table name as a SQL identifier (`"name"`, embedded quotes doubled).
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
