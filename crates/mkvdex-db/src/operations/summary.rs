//! Bulk replacement of the summary table.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::operations::table_exists;
use mkvdex_core::SchemaDescriptor;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;
use tracing::{info, warn};

/// Result of a bulk replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub deleted: usize,
    pub inserted: usize,
}

/// Create the table when absent and add any schema column it lacks.
fn ensure_table(conn: &Connection, schema: &SchemaDescriptor) -> DbResult<()> {
    conn.execute_batch(&schema.create_table_sql())?;

    let existing: HashSet<String> = {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", schema.table()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;
        names
    };

    for column in schema.columns() {
        if !existing.contains(column.name) {
            warn!(
                "Table {} is missing column {}, adding it",
                schema.table(),
                column.name
            );
            conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                schema.table(),
                column.name,
                column.sql_type
            ))?;
        }
    }

    Ok(())
}

impl Database {
    /// Replace every row of the schema's table with `rows`.
    ///
    /// Each row must hold one value per schema column, in schema order.
    /// Runs in one transaction: either the old contents or the new contents
    /// are visible, never a mix.
    pub fn replace_summary_rows(
        &self,
        schema: &SchemaDescriptor,
        rows: &[Vec<Option<String>>],
    ) -> DbResult<ReplaceOutcome> {
        if let Some(bad) = rows.iter().find(|r| r.len() != schema.len()) {
            return Err(DbError::ColumnMismatch {
                table: schema.table().to_string(),
                expected: schema.len(),
                found: bad.len(),
            });
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        ensure_table(&tx, schema)?;
        let deleted = tx.execute(&format!("DELETE FROM {}", schema.table()), [])?;

        {
            let placeholders = (1..=schema.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                schema.table(),
                schema.column_names().join(", "),
                placeholders
            ))?;

            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }

        tx.commit()?;
        info!(
            "Replaced {} rows of {} with {} rows",
            deleted,
            schema.table(),
            rows.len()
        );

        Ok(ReplaceOutcome {
            deleted,
            inserted: rows.len(),
        })
    }

    /// Row count of a table, or 0 when it does not exist yet.
    pub fn count_rows(&self, table: &str) -> DbResult<i64> {
        mkvdex_core::validate_identifier(table)?;
        let conn = self.conn()?;
        if !table_exists(&conn, table)? {
            return Ok(0);
        }
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkvdex_core::DEFAULT_SUMMARY_TABLE;

    fn row(title: &str, maxfall: Option<&str>) -> Vec<Option<String>> {
        let mut values: Vec<Option<String>> = vec![None; 12];
        values[0] = Some(title.to_string());
        values[4] = Some("HEVC".to_string());
        values[10] = maxfall.map(String::from);
        values
    }

    #[test]
    fn test_replace_discards_previous_rows() {
        let db = Database::open_in_memory().unwrap();
        let schema = SchemaDescriptor::summary(DEFAULT_SUMMARY_TABLE).unwrap();

        db.replace_summary_rows(&schema, &[row("a.mkv", None), row("b.mkv", None)])
            .unwrap();
        let outcome = db
            .replace_summary_rows(&schema, &[row("c.mkv", Some("400"))])
            .unwrap();

        assert_eq!(outcome, ReplaceOutcome { deleted: 2, inserted: 1 });
        assert_eq!(db.count_rows(DEFAULT_SUMMARY_TABLE).unwrap(), 1);

        let conn = db.conn().unwrap();
        let (title, maxfall): (String, Option<i64>) = conn
            .query_row("SELECT title, maxfall FROM media_summary", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(title, "c.mkv");
        assert_eq!(maxfall, Some(400));
    }

    #[test]
    fn test_missing_columns_are_added() {
        let db = Database::open_in_memory().unwrap();
        {
            let conn = db.conn().unwrap();
            conn.execute_batch(
                "CREATE TABLE catalogue (id INTEGER PRIMARY KEY AUTOINCREMENT, title VARCHAR(1000));
                 INSERT INTO catalogue (title) VALUES ('old.mkv');",
            )
            .unwrap();
        }

        let schema = SchemaDescriptor::summary("catalogue").unwrap();
        let outcome = db.replace_summary_rows(&schema, &[row("new.mkv", None)]).unwrap();
        assert_eq!(outcome.deleted, 1);

        let conn = db.conn().unwrap();
        let codec: String = conn
            .query_row("SELECT video_codec FROM catalogue", [], |r| r.get(0))
            .unwrap();
        assert_eq!(codec, "HEVC");
    }

    #[test]
    fn test_wrong_width_rows_are_rejected_before_any_change() {
        let db = Database::open_in_memory().unwrap();
        let schema = SchemaDescriptor::summary(DEFAULT_SUMMARY_TABLE).unwrap();
        db.replace_summary_rows(&schema, &[row("a.mkv", None)]).unwrap();

        let result = db.replace_summary_rows(&schema, &[vec![Some("x".to_string())]]);
        assert!(matches!(result, Err(DbError::ColumnMismatch { found: 1, .. })));
        assert_eq!(db.count_rows(DEFAULT_SUMMARY_TABLE).unwrap(), 1);
    }

    #[test]
    fn test_count_rows_of_missing_table() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count_rows("never_loaded").unwrap(), 0);
        assert!(db.count_rows("bad name").is_err());
    }
}
