//! Destructive bulk load of normalized dumps into the summary table.

use crate::dump::read_normalized_dump;
use crate::error::{IngestError, IngestResult};
use mkvdex_core::SchemaDescriptor;
use mkvdex_db::Database;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of [`load_summary_tables`].
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Dump files that were read.
    pub files: Vec<PathBuf>,
    /// Dump files that matched but could not be read.
    pub failed_files: Vec<PathBuf>,
    /// Rows written to the table.
    pub rows: usize,
    /// Lines dropped for having too many fields.
    pub skipped_lines: usize,
    /// Rows removed from the table before the insert.
    pub deleted: usize,
    /// False when nothing was loaded and the table was left untouched.
    pub replaced: bool,
}

/// Files directly inside `dir` whose name ends with `suffix`, sorted.
pub fn find_dump_files(dir: &Path, suffix: &str) -> IngestResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::FileNotFound(dir.to_path_buf()));
    }

    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(suffix)
    );

    let entries = glob::glob(&pattern).map_err(|e| IngestError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable path: {}", e),
        }
    }

    files.sort();
    Ok(files)
}

/// Replace the contents of `schema`'s table with every row of every dump in `dir`.
///
/// This is destructive: rows already in the table are deleted, whether or not
/// the new dumps mention them. When no dump file matches, or none can be
/// read, the table is left untouched and `replaced` is false.
pub fn load_summary_tables(
    db: &Database,
    dir: &Path,
    suffix: &str,
    delimiter: &str,
    schema: &SchemaDescriptor,
) -> IngestResult<LoadReport> {
    let matched = find_dump_files(dir, suffix)?;
    let mut report = LoadReport::default();

    if matched.is_empty() {
        warn!(
            "No files ending with {:?} in {}, nothing loaded",
            suffix,
            dir.display()
        );
        return Ok(report);
    }

    let mut rows = Vec::new();
    for path in matched {
        match read_normalized_dump(&path, delimiter, schema.len()) {
            Ok(parsed) => {
                info!("Read {} rows from {}", parsed.rows.len(), path.display());
                report.skipped_lines += parsed.skipped;
                rows.extend(parsed.rows);
                report.files.push(path);
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                report.failed_files.push(path);
            }
        }
    }

    if report.files.is_empty() {
        warn!("No dump file could be read, {} left untouched", schema.table());
        return Ok(report);
    }

    let outcome = db.replace_summary_rows(schema, &rows)?;
    report.rows = outcome.inserted;
    report.deleted = outcome.deleted;
    report.replaced = true;

    info!(
        "Loaded {} rows from {} file(s) into {}",
        report.rows,
        report.files.len(),
        schema.table()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkvdex_core::DEFAULT_SUMMARY_TABLE;
    use std::fs;

    fn line(title: &str) -> String {
        format!(
            "{}#02:00:00#40.00 GB#45.00 Mbps#HEVC#40.00 Mbps#23.976#SMPTE ST 2086#Display P3#min: 0.0050 cd/m2, max: 1000 cd/m2#400#1000",
            title
        )
    }

    fn titles(db: &Database) -> Vec<String> {
        let conn = db.conn().unwrap();
        let mut stmt = conn
            .prepare("SELECT title FROM media_summary ORDER BY title")
            .unwrap();
        let rows = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        rows
    }

    #[test]
    fn test_load_replaces_all_rows() {
        let db = Database::open_in_memory().unwrap();
        let schema = SchemaDescriptor::summary(DEFAULT_SUMMARY_TABLE).unwrap();

        let first = tempfile::tempdir().unwrap();
        fs::write(
            first.path().join("WD8A_final.txt"),
            format!("{}\n{}\n", line("a.mkv"), line("b.mkv")),
        )
        .unwrap();
        fs::write(first.path().join("WD8B_final.txt"), format!("{}\n", line("c.mkv"))).unwrap();
        fs::write(first.path().join("WD8A.txt"), "{\"raw\": true}\n").unwrap();

        let report = load_summary_tables(&db, first.path(), "_final.txt", "#", &schema).unwrap();
        assert!(report.replaced);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.rows, 3);
        assert_eq!(titles(&db), vec!["a.mkv", "b.mkv", "c.mkv"]);

        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("WD8C_final.txt"), format!("{}\n", line("d.mkv"))).unwrap();

        let report = load_summary_tables(&db, second.path(), "_final.txt", "#", &schema).unwrap();
        assert_eq!(report.deleted, 3);
        assert_eq!(titles(&db), vec!["d.mkv"]);
    }

    #[test]
    fn test_no_matching_files_leaves_table_untouched() {
        let db = Database::open_in_memory().unwrap();
        let schema = SchemaDescriptor::summary(DEFAULT_SUMMARY_TABLE).unwrap();

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("WD8A_final.txt"), format!("{}\n", line("a.mkv"))).unwrap();
        load_summary_tables(&db, dir.path(), "_final.txt", "#", &schema).unwrap();

        let empty = tempfile::tempdir().unwrap();
        let report = load_summary_tables(&db, empty.path(), "_final.txt", "#", &schema).unwrap();
        assert!(!report.replaced);
        assert_eq!(titles(&db), vec!["a.mkv"]);
    }

    #[test]
    fn test_overlong_lines_are_skipped() {
        let db = Database::open_in_memory().unwrap();
        let schema = SchemaDescriptor::summary(DEFAULT_SUMMARY_TABLE).unwrap();

        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("x_final.txt"),
            format!("{}\n{}#extra\nshort.mkv#01:00:00\n", line("ok.mkv"), line("bad.mkv")),
        )
        .unwrap();

        let report = load_summary_tables(&db, dir.path(), "_final.txt", "#", &schema).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(titles(&db), vec!["ok.mkv", "short.mkv"]);
    }

    #[test]
    fn test_find_dump_files_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("old")).unwrap();
        fs::write(dir.path().join("old").join("WD1_final.txt"), "").unwrap();
        fs::write(dir.path().join("WD2_final.txt"), "").unwrap();

        let files = find_dump_files(dir.path(), "_final.txt").unwrap();
        assert_eq!(files, vec![dir.path().join("WD2_final.txt")]);
    }
}
