//! `media_info` upsert and lookups.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::Utc;
use mkvdex_core::{MediaInfoRow, SchemaDescriptor, MEDIA_INFO_TABLE};
use rusqlite::{params, Row};
use tracing::debug;

/// Columns that identify a row; never rewritten on conflict.
const IDENTITY_COLUMNS: [&str; 2] = ["volume", "file_name"];

/// How many rows of one flush were new and how many replaced an existing row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub inserted: usize,
    pub updated: usize,
}

fn upsert_sql() -> String {
    let schema = SchemaDescriptor::media_info();
    let columns = schema.column_names();

    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    let assignments = columns
        .iter()
        .filter(|c| !IDENTITY_COLUMNS.contains(c))
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(",\n                ");

    format!(
        "INSERT INTO {table} ({columns})
            VALUES ({placeholders})
            ON CONFLICT(volume, file_name) DO UPDATE SET
                {assignments}",
        table = MEDIA_INFO_TABLE,
        columns = columns.join(", "),
    )
}

const SELECT_MEDIA: &str = r#"
    SELECT volume, file_name, duration, formatted_duration, file_size, formatted_file_size,
           overall_bit_rate, formatted_overall_bit_rate, video_format, width, height,
           video_bit_rate, formatted_video_bit_rate, frame_rate, hdr_format, color_primaries,
           mastering_display_color_primaries, mastering_display_luminance, max_fall, max_cll,
           full_json
    FROM media_info
"#;

fn row_to_media(row: &Row<'_>) -> rusqlite::Result<MediaInfoRow> {
    Ok(MediaInfoRow {
        volume: row.get(0)?,
        file_name: row.get(1)?,
        duration: row.get(2)?,
        formatted_duration: row.get(3)?,
        file_size: row.get(4)?,
        formatted_file_size: row.get(5)?,
        overall_bit_rate: row.get(6)?,
        formatted_overall_bit_rate: row.get(7)?,
        video_format: row.get(8)?,
        width: row.get(9)?,
        height: row.get(10)?,
        video_bit_rate: row.get(11)?,
        formatted_video_bit_rate: row.get(12)?,
        frame_rate: row.get(13)?,
        hdr_format: row.get(14)?,
        color_primaries: row.get(15)?,
        mastering_display_color_primaries: row.get(16)?,
        mastering_display_luminance: row.get(17)?,
        max_fall: row.get(18)?,
        max_cll: row.get(19)?,
        full_json: row.get(20)?,
    })
}

impl Database {
    /// Merge a batch of rows into `media_info` in one transaction.
    ///
    /// Rows are matched on `(volume, file_name)`; a match has every other
    /// column overwritten. Nothing is ever deleted. On any error the whole
    /// batch is rolled back.
    pub fn upsert_media_batch(&self, rows: &[MediaInfoRow]) -> DbResult<UpsertCounts> {
        let mut counts = UpsertCounts::default();
        if rows.is_empty() {
            return Ok(counts);
        }

        let updated_at = Utc::now().to_rfc3339();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut exists = tx.prepare(
                "SELECT COUNT(*) FROM media_info WHERE volume = ?1 AND file_name = ?2",
            )?;
            let mut upsert = tx.prepare(&upsert_sql())?;

            for row in rows {
                let existing: i64 =
                    exists.query_row(params![row.volume, row.file_name], |r| r.get(0))?;

                upsert.execute(params![
                    row.volume,
                    row.file_name,
                    row.duration,
                    row.formatted_duration,
                    row.file_size,
                    row.formatted_file_size,
                    row.overall_bit_rate,
                    row.formatted_overall_bit_rate,
                    row.video_format,
                    row.width,
                    row.height,
                    row.video_bit_rate,
                    row.formatted_video_bit_rate,
                    row.frame_rate,
                    row.hdr_format,
                    row.color_primaries,
                    row.mastering_display_color_primaries,
                    row.mastering_display_luminance,
                    row.max_fall,
                    row.max_cll,
                    row.full_json,
                    updated_at,
                ])?;

                if existing > 0 {
                    counts.updated += 1;
                } else {
                    counts.inserted += 1;
                }
            }
        }

        tx.commit()?;
        debug!(
            "Upserted {} rows ({} new, {} updated)",
            rows.len(),
            counts.inserted,
            counts.updated
        );
        Ok(counts)
    }

    /// Get one row by its identity key.
    pub fn get_media(&self, volume: &str, file_name: &str) -> DbResult<MediaInfoRow> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE volume = ?1 AND file_name = ?2", SELECT_MEDIA),
            params![volume, file_name],
            row_to_media,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("Media not found: {}/{}", volume, file_name))
            }
            _ => DbError::from(e),
        })
    }

    /// All rows of one volume, ordered by file name.
    pub fn list_media_by_volume(&self, volume: &str) -> DbResult<Vec<MediaInfoRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE volume = ?1 ORDER BY file_name",
            SELECT_MEDIA
        ))?;

        let rows = stmt
            .query_map(params![volume], row_to_media)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_media(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM media_info", [], |row| row.get(0))?;
        Ok(count)
    }

    /// `updated_at` of one row, as written by the last upsert.
    pub fn media_updated_at(&self, volume: &str, file_name: &str) -> DbResult<Option<String>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT updated_at FROM media_info WHERE volume = ?1 AND file_name = ?2",
            params![volume, file_name],
            |row| row.get(0),
        );

        match result {
            Ok(updated_at) => Ok(Some(updated_at)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }
}
