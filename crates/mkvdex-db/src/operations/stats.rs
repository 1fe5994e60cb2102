//! Catalogue statistics.

use crate::database::Database;
use crate::error::DbResult;
use crate::operations::table_exists;
use mkvdex_core::{is_4k_resolution, validate_identifier, CatalogStats};

impl Database {
    /// Collect catalogue statistics; `summary_table` may not exist yet.
    pub fn get_stats(&self, summary_table: &str) -> DbResult<CatalogStats> {
        validate_identifier(summary_table)?;
        let size = self.size_bytes()?;
        let conn = self.conn()?;

        let mut stats = CatalogStats {
            database_size_bytes: size,
            ..Default::default()
        };

        stats.total_media =
            conn.query_row("SELECT COUNT(*) FROM media_info", [], |row| row.get(0))?;

        {
            let mut stmt =
                conn.prepare("SELECT volume, COUNT(*) FROM media_info GROUP BY volume")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (volume, count) = row?;
                stats.media_by_volume.insert(volume, count);
            }
        }

        stats.hevc_media = conn.query_row(
            "SELECT COUNT(*) FROM media_info WHERE video_format = 'HEVC'",
            [],
            |row| row.get(0),
        )?;

        stats.hdr_media = conn.query_row(
            "SELECT COUNT(*) FROM media_info WHERE COALESCE(hdr_format, '') <> ''",
            [],
            |row| row.get(0),
        )?;

        {
            let mut stmt = conn.prepare(
                "SELECT width, height, COUNT(*) FROM media_info
                 WHERE width IS NOT NULL AND height IS NOT NULL
                 GROUP BY width, height",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;
            for row in rows {
                let (width, height, count) = row?;
                if let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) {
                    if is_4k_resolution(w, h) {
                        stats.uhd_media += count;
                    }
                }
            }
        }

        stats.embedded_media =
            conn.query_row("SELECT COUNT(*) FROM media_embeddings", [], |row| row.get(0))?;

        if table_exists(&conn, summary_table)? {
            stats.summary_rows = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", summary_table),
                [],
                |row| row.get(0),
            )?;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::media::tests::sample_row;

    #[test]
    fn test_stats() {
        let db = Database::open_in_memory().unwrap();

        let mut avc = sample_row("WD8B", "old.mkv");
        avc.video_format = Some("AVC".to_string());
        avc.width = Some(1920);
        avc.height = Some(1080);
        avc.hdr_format = None;

        db.upsert_media_batch(&[sample_row("WD8A", "a.mkv"), sample_row("WD8A", "b.mkv"), avc])
            .unwrap();

        let stats = db.get_stats("media_summary").unwrap();
        assert_eq!(stats.total_media, 3);
        assert_eq!(stats.media_by_volume.get("WD8A"), Some(&2));
        assert_eq!(stats.media_by_volume.get("WD8B"), Some(&1));
        assert_eq!(stats.hevc_media, 2);
        assert_eq!(stats.uhd_media, 2);
        assert_eq!(stats.hdr_media, 2);
        assert_eq!(stats.summary_rows, 0);
        assert_eq!(stats.embedded_media, 0);
    }
}
