//! Paginated free-text search over a catalogue table.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::operations::{table_exists, value_to_text};
use mkvdex_core::SchemaDescriptor;
use rusqlite::params;

/// One matching row: its id and the schema columns, rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRow {
    pub id: i64,
    pub values: Vec<Option<String>>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub columns: Vec<String>,
    pub rows: Vec<SearchRow>,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    /// Matching rows across all pages.
    pub total: usize,
    pub total_pages: usize,
}

impl SearchPage {
    /// Value of the named column in one of this page's rows.
    pub fn value<'a>(&self, row: &'a SearchRow, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        row.values.get(idx)?.as_deref()
    }
}

/// `LIKE` pattern matching `query` literally anywhere in a value.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Database {
    /// Case-insensitive substring search across every searchable column.
    ///
    /// A blank query matches all rows. Results are ordered by id; page 0 is
    /// treated as page 1.
    pub fn search(
        &self,
        schema: &SchemaDescriptor,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> DbResult<SearchPage> {
        if page_size == 0 {
            return Err(DbError::Other("page size must be positive".to_string()));
        }
        let page = page.max(1);

        let conn = self.conn()?;
        if !table_exists(&conn, schema.table())? {
            return Err(DbError::NotFound(format!(
                "Table {} does not exist yet",
                schema.table()
            )));
        }

        // NULL columns compare as empty text so a blank query matches every row
        let filter = schema
            .searchable_columns()
            .iter()
            .map(|c| format!("COALESCE({}, '') LIKE ?1 ESCAPE '\\'", c))
            .collect::<Vec<_>>()
            .join(" OR ");
        let pattern = like_pattern(query.trim());

        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {}", schema.table(), filter);
        let total: i64 = conn.query_row(&count_sql, params![pattern], |row| row.get(0))?;

        let columns = schema.column_names();
        let select_sql = format!(
            "SELECT id, {} FROM {} WHERE {} ORDER BY id LIMIT ?2 OFFSET ?3",
            columns.join(", "),
            schema.table(),
            filter
        );

        let offset = (page - 1) * page_size;
        let mut stmt = conn.prepare(&select_sql)?;
        let rows = stmt
            .query_map(params![pattern, page_size as i64, offset as i64], |row| {
                let id: i64 = row.get(0)?;
                let mut values = Vec::with_capacity(columns.len());
                for idx in 1..=columns.len() {
                    values.push(value_to_text(row.get_ref(idx)?));
                }
                Ok(SearchRow { id, values })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total = total as usize;
        Ok(SearchPage {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::media::tests::sample_row;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        let rows: Vec<_> = (1..=23)
            .map(|i| sample_row("WD8A", &format!("Movie {:02}.mkv", i)))
            .chain([sample_row("WD8B", "Arrival 100%.mkv")])
            .collect();
        db.upsert_media_batch(&rows).unwrap();
        db
    }

    #[test]
    fn test_pagination() {
        let db = seeded();
        let schema = SchemaDescriptor::media_info();

        let page = db.search(&schema, "movie", 3, 10).unwrap();
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.value(&page.rows[0], "file_name"), Some("Movie 21.mkv"));

        // Page 0 means the first page
        let first = db.search(&schema, "movie", 0, 10).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.value(&first.rows[0], "file_name"), Some("Movie 01.mkv"));
    }

    #[test]
    fn test_search_matches_any_column_case_insensitively() {
        let db = seeded();
        let schema = SchemaDescriptor::media_info();

        assert_eq!(db.search(&schema, "wd8b", 1, 10).unwrap().total, 1);
        assert_eq!(db.search(&schema, "hevc", 1, 10).unwrap().total, 24);
        assert_eq!(db.search(&schema, "nothing like this", 1, 10).unwrap().total, 0);
        assert_eq!(db.search(&schema, "", 1, 10).unwrap().total, 24);
    }

    #[test]
    fn test_wildcards_are_literal() {
        let db = seeded();
        let schema = SchemaDescriptor::media_info();

        let page = db.search(&schema, "100%", 1, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(db.search(&schema, "_", 1, 10).unwrap().total, 0);
    }

    #[test]
    fn test_missing_table_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let schema = SchemaDescriptor::summary("never_loaded").unwrap();
        assert!(matches!(
            db.search(&schema, "x", 1, 10),
            Err(DbError::NotFound(_))
        ));
    }
}
