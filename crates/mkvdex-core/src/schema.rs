//! Table schemas shared by the loaders and the read side.

use crate::error::{Error, Result};

/// Table written by the upsert loader.
pub const MEDIA_INFO_TABLE: &str = "media_info";

/// Default table written by the bulk-replace loader.
pub const DEFAULT_SUMMARY_TABLE: &str = "media_summary";

/// A typed column of a catalogue table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    /// Whether free-text search looks at this column.
    pub searchable: bool,
}

const fn column(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        searchable: true,
    }
}

const fn hidden(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        searchable: false,
    }
}

/// Columns of a normalized dump line, in file order.
const SUMMARY_COLUMNS: [ColumnDef; 12] = [
    column("title", "VARCHAR(1000)"),
    column("duration", "VARCHAR(20)"),
    column("file_size_gb", "VARCHAR(50)"),
    column("overall_bitrate", "VARCHAR(50)"),
    column("video_codec", "VARCHAR(20)"),
    column("video_bitrate", "VARCHAR(50)"),
    column("video_framerate", "VARCHAR(10)"),
    column("hdr_format", "VARCHAR(4000)"),
    column("masteringdisplay_color_primaries", "TEXT"),
    column("masteringdisplay_luminance", "VARCHAR(1000)"),
    column("maxfall", "INTEGER"),
    column("maxcll", "INTEGER"),
];

const MEDIA_INFO_COLUMNS: [ColumnDef; 22] = [
    column("volume", "TEXT NOT NULL"),
    column("file_name", "TEXT NOT NULL"),
    column("duration", "INTEGER"),
    column("formatted_duration", "TEXT"),
    column("file_size", "INTEGER"),
    column("formatted_file_size", "TEXT"),
    column("overall_bit_rate", "INTEGER"),
    column("formatted_overall_bit_rate", "TEXT"),
    column("video_format", "TEXT"),
    column("width", "INTEGER"),
    column("height", "INTEGER"),
    column("video_bit_rate", "INTEGER"),
    column("formatted_video_bit_rate", "TEXT"),
    column("frame_rate", "REAL"),
    column("hdr_format", "TEXT"),
    column("color_primaries", "TEXT"),
    column("mastering_display_color_primaries", "TEXT"),
    column("mastering_display_luminance", "TEXT"),
    column("max_fall", "INTEGER"),
    column("max_cll", "INTEGER"),
    hidden("full_json", "TEXT NOT NULL"),
    hidden("updated_at", "TEXT NOT NULL"),
];

/// Immutable description of a catalogue table: its name and ordered columns.
///
/// Every table also carries an `id INTEGER PRIMARY KEY AUTOINCREMENT`
/// column that is not listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    table: String,
    columns: Vec<ColumnDef>,
}

impl SchemaDescriptor {
    /// Schema of the bulk-loaded summary table.
    pub fn summary(table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self {
            table,
            columns: SUMMARY_COLUMNS.to_vec(),
        })
    }

    /// Schema of the upserted `media_info` table.
    pub fn media_info() -> Self {
        Self {
            table: MEDIA_INFO_TABLE.to_string(),
            columns: MEDIA_INFO_COLUMNS.to_vec(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn searchable_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| c.name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this schema.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {} {}", c.name, c.sql_type))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n{}\n)",
            self.table, columns
        )
    }
}

/// Table names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is allowed.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid table name: {:?}", name)))
    }
}
