//! Probe dumps (one JSON record per line) and normalized delimited dumps.

use crate::error::{IngestError, IngestResult};
use crate::scanner::scan_media_files;
use mkvdex_core::{extract_fields, RawMediaRecord, NULL_MARKER};
use mkvdex_process::Prober;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Field delimiter of normalized dumps.
pub const DEFAULT_DELIMITER: &str = "#";

/// File name suffix of normalized dumps.
pub const DEFAULT_DUMP_SUFFIX: &str = "_final.txt";

/// Longest excerpt of a bad line that is logged.
const LOG_EXCERPT_CHARS: usize = 200;

/// Outcome of [`write_normalized_dump`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpReport {
    /// Non-blank input lines.
    pub lines: usize,
    /// Records written to the output.
    pub written: usize,
    /// Records dropped by the codec filter.
    pub rejected: usize,
    /// Lines that could not be parsed or extracted.
    pub failed: usize,
}

/// Outcome of [`write_probe_dump`].
#[derive(Debug, Clone, Default)]
pub struct ProbeDumpReport {
    pub scanned: usize,
    pub written: usize,
    /// Files whose probe failed, with the reason.
    pub errors: Vec<(PathBuf, String)>,
    /// Copy of the previous dump, if there was one.
    pub backup: Option<PathBuf>,
}

/// Rows parsed from a normalized dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRows {
    pub rows: Vec<Vec<Option<String>>>,
    /// Lines dropped for having too many fields.
    pub skipped: usize,
}

fn excerpt(line: &str) -> String {
    line.chars().take(LOG_EXCERPT_CHARS).collect()
}

/// Backup location for a dump: same directory and stem, `.bkp` extension.
pub fn backup_path(dump_path: &Path) -> PathBuf {
    dump_path.with_extension("bkp")
}

/// Turn a probe dump into a normalized dump.
///
/// The output is truncated first. Blank lines are ignored; lines that are not
/// UTF-8 or fail to parse or extract are logged and counted, and the run
/// continues. Values containing `delimiter` are written as-is with a warning. Output
/// depends only on the input, so repeated runs produce identical files.
pub fn write_normalized_dump(
    input: &Path,
    output: &Path,
    delimiter: &str,
) -> IngestResult<DumpReport> {
    if delimiter.is_empty() {
        return Err(IngestError::InvalidArgument(
            "delimiter must not be empty".to_string(),
        ));
    }
    if !input.is_file() {
        return Err(IngestError::FileNotFound(input.to_path_buf()));
    }

    info!(
        "Writing normalized dump {} from {}",
        output.display(),
        input.display()
    );

    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let mut report = DumpReport::default();

    for (idx, line) in reader.split(b'\n').enumerate() {
        let bytes = line?;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.trim(),
            Err(e) => {
                report.lines += 1;
                report.failed += 1;
                warn!(
                    "Skipping line {} of {}: {} ({})",
                    idx + 1,
                    input.display(),
                    e,
                    excerpt(&String::from_utf8_lossy(&bytes))
                );
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        report.lines += 1;

        let extracted = RawMediaRecord::from_json_str(line).and_then(|r| extract_fields(&r));
        match extracted {
            Ok(Some(fields)) => {
                let clashing = fields.fields_containing(delimiter);
                if !clashing.is_empty() {
                    warn!(
                        "Line {} of {}: {} contain {:?} and will not load back",
                        idx + 1,
                        input.display(),
                        clashing.join(", "),
                        delimiter
                    );
                }
                writeln!(writer, "{}", fields.to_delimited(delimiter))?;
                report.written += 1;
            }
            Ok(None) => {
                debug!("Line {} is not HEVC, skipping", idx + 1);
                report.rejected += 1;
            }
            Err(e) => {
                warn!(
                    "Skipping line {} of {}: {} ({})",
                    idx + 1,
                    input.display(),
                    e,
                    excerpt(line)
                );
                report.failed += 1;
            }
        }
    }

    writer.flush()?;
    info!(
        "Wrote {} of {} records to {}",
        report.written,
        report.lines,
        output.display()
    );
    Ok(report)
}

/// Probe every media file under `root` and write one JSON record per line.
///
/// An existing dump is copied to [`backup_path`] first. Probe failures are
/// logged and collected in the report. `on_file` is called before each probe.
pub fn write_probe_dump<F>(
    root: &Path,
    extensions: &[String],
    prober: &dyn Prober,
    dump_path: &Path,
    mut on_file: F,
) -> IngestResult<ProbeDumpReport>
where
    F: FnMut(&Path),
{
    let files = scan_media_files(root, extensions)?;
    if files.is_empty() {
        return Err(IngestError::NoMediaFiles(root.to_path_buf()));
    }

    let mut report = ProbeDumpReport {
        scanned: files.len(),
        ..Default::default()
    };

    if dump_path.is_file() {
        let backup = backup_path(dump_path);
        std::fs::copy(dump_path, &backup)?;
        info!("Backup created at {}", backup.display());
        report.backup = Some(backup);
    }

    if let Some(parent) = dump_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(dump_path)?);

    for (idx, path) in files.iter().enumerate() {
        on_file(path.as_path());
        match prober.probe(path) {
            Ok(record) => {
                writeln!(writer, "{}", record.to_json_line())?;
                report.written += 1;
                debug!("[{}] Dumped media info for {}", idx + 1, path.display());
            }
            Err(e) => {
                warn!("[{}] Failed to probe {}: {}", idx + 1, path.display(), e);
                report.errors.push((path.clone(), e.to_string()));
            }
        }
    }

    writer.flush()?;
    info!(
        "Dumped media info for {} file(s) to {} ({} errors)",
        report.written,
        dump_path.display(),
        report.errors.len()
    );
    Ok(report)
}

/// Parse a headerless normalized dump into rows of exactly `width` values.
///
/// Lines with more fields than `width` are logged and skipped; shorter lines
/// are padded with `None`. Empty values and [`NULL_MARKER`] become `None`.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_normalized_dump(
    path: &Path,
    delimiter: &str,
    width: usize,
) -> IngestResult<NormalizedRows> {
    if delimiter.is_empty() {
        return Err(IngestError::InvalidArgument(
            "delimiter must not be empty".to_string(),
        ));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut parsed = NormalizedRows::default();

    for (idx, line) in reader.split(b'\n').enumerate() {
        let bytes = line?;
        let line = String::from_utf8_lossy(&bytes);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let mut values: Vec<Option<String>> = line
            .split(delimiter)
            .map(|v| {
                let v = v.trim();
                if v.is_empty() || v == NULL_MARKER {
                    None
                } else {
                    Some(v.to_string())
                }
            })
            .collect();

        if values.len() > width {
            warn!(
                "Skipping line {} of {}: {} fields, expected {} ({})",
                idx + 1,
                path.display(),
                values.len(),
                width,
                excerpt(line)
            );
            parsed.skipped += 1;
            continue;
        }

        values.resize(width, None);
        parsed.rows.push(values);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkvdex_process::{ProcessError, ProcessResult};
    use serde_json::json;
    use std::fs;

    fn probe_line(name: &str, codec: &str) -> String {
        json!({
            "media": {
                "@ref": format!("F:\\Movies\\{}", name),
                "track": [
                    {"@type": "General", "Duration": "5400.000", "FileSize": "1073741824"},
                    {"@type": "Video", "Format": codec, "BitRate": "20000000", "MaxCLL": "1000 cd/m2"}
                ]
            }
        })
        .to_string()
    }

    fn sample_dump(dir: &Path) -> PathBuf {
        let input = dir.join("WD8A_10TB.txt");
        let lines = [
            probe_line("Dune.mkv", "HEVC"),
            String::new(),
            probe_line("Old.mkv", "AVC"),
            "{not json".to_string(),
            probe_line("Arrival.mkv", "HEVC"),
        ];
        fs::write(&input, lines.join("\n")).unwrap();
        input
    }

    #[test]
    fn test_normalized_dump_counts_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let input = sample_dump(dir.path());
        let output = dir.path().join("WD8A_10TB_final.txt");

        let report = write_normalized_dump(&input, &output, "#").unwrap();
        assert_eq!(
            report,
            DumpReport {
                lines: 4,
                written: 2,
                rejected: 1,
                failed: 1
            }
        );

        let contents = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Dune.mkv#01:30:00#1.00 GB#None#HEVC#20.00 Mbps#None#None#None#None#None#1000"
        );
        assert!(lines[1].starts_with("Arrival.mkv#"));
    }

    #[test]
    fn test_normalized_dump_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let input = sample_dump(dir.path());
        let output = dir.path().join("out_final.txt");

        write_normalized_dump(&input, &output, "#").unwrap();
        let first = fs::read(&output).unwrap();

        // A second run truncates rather than appends
        write_normalized_dump(&input, &output, "#").unwrap();
        let second = fs::read(&output).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_utf8_line_is_counted_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("WD8B.txt");
        let output = dir.path().join("WD8B_final.txt");

        let mut bytes = probe_line("Dune.mkv", "HEVC").into_bytes();
        bytes.extend_from_slice(b"\n{\"media\":{\"@ref\":\"caf\xe9.mkv\",\"track\":[]}}\n");
        bytes.extend_from_slice(probe_line("Arrival.mkv", "HEVC").as_bytes());
        fs::write(&input, bytes).unwrap();

        let report = write_normalized_dump(&input, &output, "#").unwrap();
        assert_eq!(report.lines, 3);
        assert_eq!(report.written, 2);
        assert_eq!(report.failed, 1);

        let contents = fs::read_to_string(&output).unwrap();
        let titles: Vec<_> = contents
            .lines()
            .map(|l| l.split('#').next().unwrap())
            .collect();
        assert_eq!(titles, vec!["Dune.mkv", "Arrival.mkv"]);
    }

    #[test]
    fn test_read_normalized_dump_pads_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_final.txt");
        fs::write(&path, "a.mkv#None##HEVC\r\n\nb.mkv#1#2#3#4#5\nc.mkv\n").unwrap();

        let parsed = read_normalized_dump(&path, "#", 4).unwrap();
        assert_eq!(parsed.skipped, 1);
        assert_eq!(
            parsed.rows,
            vec![
                vec![Some("a.mkv".to_string()), None, None, Some("HEVC".to_string())],
                vec![Some("c.mkv".to_string()), None, None, None],
            ]
        );
    }

    struct FakeProber;

    impl Prober for FakeProber {
        fn probe(&self, path: &Path) -> ProcessResult<RawMediaRecord> {
            if path.to_string_lossy().contains("corrupt") {
                return Err(ProcessError::ParseError("no media section".to_string()));
            }
            RawMediaRecord::from_value(json!({
                "media": {"@ref": path.to_string_lossy(), "track": []}
            }))
            .map_err(|e| ProcessError::ParseError(e.to_string()))
        }
    }

    #[test]
    fn test_probe_dump_backs_up_and_collects_errors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("volume");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.mkv"), b"").unwrap();
        fs::write(root.join("corrupt.mkv"), b"").unwrap();

        let dump = dir.path().join("WD8A_10TB.txt");
        fs::write(&dump, "previous run\n").unwrap();

        let mut seen = 0;
        let report =
            write_probe_dump(&root, &["mkv".to_string()], &FakeProber, &dump, |_| seen += 1)
                .unwrap();

        assert_eq!(seen, 2);
        assert_eq!(report.scanned, 2);
        assert_eq!(report.written, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].0.ends_with("corrupt.mkv"));

        let backup = report.backup.unwrap();
        assert_eq!(backup, dir.path().join("WD8A_10TB.bkp"));
        assert_eq!(fs::read_to_string(backup).unwrap(), "previous run\n");

        let dumped = fs::read_to_string(&dump).unwrap();
        assert_eq!(dumped.lines().count(), 1);
        assert!(RawMediaRecord::from_json_str(dumped.trim()).is_ok());
    }

    #[test]
    fn test_probe_dump_without_media_files() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("dump.txt");
        assert!(matches!(
            write_probe_dump(dir.path(), &["mkv".to_string()], &FakeProber, &dump, |_| {}),
            Err(IngestError::NoMediaFiles(_))
        ));
        assert!(!dump.exists());
    }
}
