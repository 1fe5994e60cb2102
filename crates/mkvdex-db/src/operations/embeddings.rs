//! Embedding storage and nearest-neighbour lookup for `media_info` rows.

use crate::database::Database;
use crate::error::DbResult;
use chrono::Utc;
use mkvdex_core::SimilarMedia;
use rusqlite::params;
use std::cmp::Ordering;

/// Euclidean distance between two vectors, or `None` when their lengths differ.
pub fn l2_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let sum: f32 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum();
    Some(sum.sqrt())
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_vector(bytes: &[u8], dimensions: usize) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .take(dimensions)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

impl Database {
    /// Store (or replace) the embedding of one `media_info` row.
    pub fn store_media_embedding(&self, media_id: i64, vector: &[f32], model: &str) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO media_embeddings (media_id, vector, model, dimensions, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                media_id,
                encode_vector(vector),
                model,
                vector.len() as i64,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Rows without an embedding yet, as `(id, full_json)`.
    pub fn get_unembedded_media(&self, limit: usize) -> DbResult<Vec<(i64, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT m.id, m.full_json
            FROM media_info m
            LEFT JOIN media_embeddings e ON e.media_id = m.id
            WHERE e.media_id IS NULL
            ORDER BY m.id
            LIMIT ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Drop every stored embedding, e.g. after switching models.
    pub fn clear_media_embeddings(&self) -> DbResult<usize> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM media_embeddings", [])?)
    }

    /// The `k` stored vectors closest to `query` by L2 distance, nearest first.
    ///
    /// Brute force over every embedding; vectors of another dimension are skipped.
    pub fn nearest_media(&self, query: &[f32], k: usize) -> DbResult<Vec<SimilarMedia>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT m.id, m.volume, m.file_name, e.vector, e.dimensions
            FROM media_embeddings e
            JOIN media_info m ON m.id = e.media_id
            "#,
        )?;

        let mut results = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let bytes: Vec<u8> = row.get(3)?;
            let dimensions: i64 = row.get(4)?;
            let vector = decode_vector(&bytes, dimensions.max(0) as usize);

            if let Some(distance) = l2_distance(query, &vector) {
                results.push(SimilarMedia {
                    media_id: row.get(0)?,
                    volume: row.get(1)?,
                    file_name: row.get(2)?,
                    distance,
                });
            }
        }

        results.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    /// Embedding statistics: (embedded_count, total_count).
    pub fn embedding_stats(&self) -> DbResult<(i64, i64)> {
        let conn = self.conn()?;

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM media_info", [], |row| row.get(0))?;
        let embedded: i64 =
            conn.query_row("SELECT COUNT(*) FROM media_embeddings", [], |row| row.get(0))?;

        Ok((embedded, total))
    }
}
