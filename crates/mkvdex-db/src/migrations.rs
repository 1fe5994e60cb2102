//! Database migrations and schema management.

use crate::error::{DbError, DbResult};
use mkvdex_core::SchemaDescriptor;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> DbResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(&SchemaDescriptor::media_info().create_table_sql())?;

    conn.execute_batch(
        r#"
        -- One row per file per volume
        CREATE UNIQUE INDEX IF NOT EXISTS idx_media_info_identity
            ON media_info(volume, file_name);
        CREATE INDEX IF NOT EXISTS idx_media_info_format ON media_info(video_format);

        -- Embeddings of media_info.full_json (little-endian f32 BLOB)
        CREATE TABLE IF NOT EXISTS media_embeddings (
            media_id INTEGER PRIMARY KEY REFERENCES media_info(id) ON DELETE CASCADE,
            vector BLOB NOT NULL,
            model TEXT NOT NULL,
            dimensions INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}
