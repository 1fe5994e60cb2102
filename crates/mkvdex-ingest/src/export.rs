//! CSV export of the `media_info` table.

use crate::error::{IngestError, IngestResult};
use mkvdex_db::{Database, EXPORT_COLUMNS};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Quote `value` when it holds the delimiter, a quote or a line break.
fn escape_field(value: &str, delimiter: char) -> String {
    if value.contains(delimiter) || value.contains(['"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_record<W: Write>(
    out: &mut W,
    fields: impl Iterator<Item = String>,
    delimiter: char,
) -> std::io::Result<()> {
    let mut first = true;
    for field in fields {
        if !first {
            write!(out, "{}", delimiter)?;
        }
        first = false;
        out.write_all(escape_field(&field, delimiter).as_bytes())?;
    }
    out.write_all(b"\n")
}

/// Write a header row and one row per media record to `out`.
///
/// NULL values become empty fields. Returns the number of data rows.
pub fn export_csv<W: Write>(db: &Database, mut out: W, delimiter: char) -> IngestResult<usize> {
    if matches!(delimiter, '"' | '\n' | '\r') {
        return Err(IngestError::InvalidArgument(format!(
            "{:?} cannot be used as a delimiter",
            delimiter
        )));
    }

    write_record(
        &mut out,
        EXPORT_COLUMNS.iter().map(|(_, header)| header.to_string()),
        delimiter,
    )?;

    let count = db.for_each_export_row(|values| {
        write_record(
            &mut out,
            values.iter().map(|v| v.clone().unwrap_or_default()),
            delimiter,
        )
    })?;

    out.flush()?;
    Ok(count)
}

/// Export to a file, replacing it if it exists.
pub fn export_csv_file(db: &Database, path: &Path, delimiter: char) -> IngestResult<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let writer = BufWriter::new(File::create(path)?);
    let count = export_csv(db, writer, delimiter)?;
    info!("Exported {} rows to {}", count, path.display());
    Ok(count)
}
