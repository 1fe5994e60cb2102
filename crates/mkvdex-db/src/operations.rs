//! Catalogue operations.

pub mod embeddings;
pub mod export;
pub mod media;
pub mod search;
pub mod stats;
pub mod summary;

use crate::error::DbResult;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};

/// Whether a table with this name exists.
pub(crate) fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Render a column value for display; NULL stays `None`.
pub(crate) fn value_to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(format!("<{} bytes>", b.len())),
    }
}
