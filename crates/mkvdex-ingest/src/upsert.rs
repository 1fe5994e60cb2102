//! Batched upsert of probe results into `media_info`.

use crate::error::{IngestError, IngestResult};
use crate::scanner::scan_media_files;
use mkvdex_core::MediaInfoRow;
use mkvdex_db::Database;
use mkvdex_process::Prober;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Rows per transaction unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Outcome of an upsert run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertReport {
    /// Media files found under the root.
    pub scanned: usize,
    /// Files probed and written.
    pub ingested: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Size of every flush, in order.
    pub flushes: Vec<usize>,
    /// Files whose probe failed, with the reason.
    pub errors: Vec<(PathBuf, String)>,
}

/// Probes media files and merges them into `media_info` in fixed-size batches.
///
/// Each batch is one transaction keyed on `(volume, file_name)`. Rows for
/// files that disappeared from the volume are never removed.
pub struct UpsertLoader<'a> {
    db: &'a Database,
    prober: &'a dyn Prober,
    volume: String,
    batch_size: usize,
    extensions: Vec<String>,
}

impl<'a> UpsertLoader<'a> {
    pub fn new(db: &'a Database, prober: &'a dyn Prober, volume: impl Into<String>) -> Self {
        Self {
            db,
            prober,
            volume: volume.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            extensions: vec!["mkv".to_string()],
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn volume(&self) -> &str {
        &self.volume
    }

    /// Media files under `root`, in the order they will be loaded.
    pub fn scan(&self, root: &Path) -> IngestResult<Vec<PathBuf>> {
        scan_media_files(root, &self.extensions)
    }

    /// Scan `root` and load every media file found.
    pub fn run(&self, root: &Path) -> IngestResult<UpsertReport> {
        let files = self.scan(root)?;
        self.load_files(&files, |_| {})
    }

    /// Probe and upsert `files`; `on_file` is called after each file is handled.
    ///
    /// Probe failures are logged and collected. A failed flush rolls back
    /// that batch and aborts the run; earlier batches stay committed.
    pub fn load_files<F>(&self, files: &[PathBuf], mut on_file: F) -> IngestResult<UpsertReport>
    where
        F: FnMut(&Path),
    {
        if self.batch_size == 0 {
            return Err(IngestError::InvalidArgument(
                "batch size must be positive".to_string(),
            ));
        }
        if self.volume.trim().is_empty() {
            return Err(IngestError::InvalidArgument(
                "volume label must not be empty".to_string(),
            ));
        }

        let mut report = UpsertReport {
            scanned: files.len(),
            ..Default::default()
        };
        let mut batch: Vec<MediaInfoRow> = Vec::with_capacity(self.batch_size);

        for (idx, path) in files.iter().enumerate() {
            debug!("[{}/{}] Processing {}", idx + 1, files.len(), path.display());
            match self.prober.probe(path) {
                Ok(mut record) => {
                    record.set_volume(&self.volume);
                    batch.push(MediaInfoRow::from_record(&self.volume, &record));
                    report.ingested += 1;
                }
                Err(e) => {
                    warn!("[{}] Failed to probe {}: {}", idx + 1, path.display(), e);
                    report.errors.push((path.clone(), e.to_string()));
                }
            }
            on_file(path.as_path());

            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut report)?;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut report)?;
        }

        info!(
            "Upserted {} of {} files on {} ({} new, {} updated, {} errors)",
            report.ingested,
            report.scanned,
            self.volume,
            report.inserted,
            report.updated,
            report.errors.len()
        );
        Ok(report)
    }

    fn flush(&self, batch: &mut Vec<MediaInfoRow>, report: &mut UpsertReport) -> IngestResult<()> {
        let counts = self.db.upsert_media_batch(batch)?;
        info!("Committed batch of {} rows", batch.len());

        report.flushes.push(batch.len());
        report.inserted += counts.inserted;
        report.updated += counts.updated;
        batch.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkvdex_core::RawMediaRecord;
    use mkvdex_process::{ProcessError, ProcessResult};
    use serde_json::json;
    use std::cell::Cell;
    use std::fs;

    /// Reports a fixed bit rate for every file; fails for names containing "broken".
    struct FakeProber {
        bit_rate: Cell<i64>,
    }

    impl FakeProber {
        fn new(bit_rate: i64) -> Self {
            Self {
                bit_rate: Cell::new(bit_rate),
            }
        }
    }

    impl Prober for FakeProber {
        fn probe(&self, path: &Path) -> ProcessResult<RawMediaRecord> {
            let reference = path.to_string_lossy().to_string();
            if reference.contains("broken") {
                return Err(ProcessError::ProcessFailed {
                    code: 1,
                    stderr: "unreadable".to_string(),
                });
            }

            RawMediaRecord::from_value(json!({
                "media": {
                    "@ref": reference,
                    "track": [
                        {"@type": "General", "Duration": "3600.000", "FileSize": "1024"},
                        {"@type": "Video", "Format": "AVC", "BitRate": self.bit_rate.get().to_string()}
                    ]
                }
            }))
            .map_err(|e| ProcessError::ParseError(e.to_string()))
        }
    }

    fn volume_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_flushes_follow_batch_size() {
        let db = Database::open_in_memory().unwrap();
        let root = volume_with(&["1.mkv", "2.mkv", "3.mkv", "4.mkv", "5.mkv"]);
        let prober = FakeProber::new(8_000_000);

        let report = UpsertLoader::new(&db, &prober, "WD8A")
            .with_batch_size(2)
            .run(root.path())
            .unwrap();

        assert_eq!(report.flushes, vec![2, 2, 1]);
        assert_eq!(report.scanned, 5);
        assert_eq!(report.ingested, 5);
        assert_eq!(report.inserted, 5);
        assert_eq!(db.count_media().unwrap(), 5);
    }

    #[test]
    fn test_rerun_updates_in_place() {
        let db = Database::open_in_memory().unwrap();
        let root = volume_with(&["a.mkv", "b.mkv"]);
        let prober = FakeProber::new(8_000_000);
        let loader = UpsertLoader::new(&db, &prober, "WD8A");

        loader.run(root.path()).unwrap();
        prober.bit_rate.set(12_500_000);
        let report = loader.run(root.path()).unwrap();

        assert_eq!(report.inserted, 0);
        assert_eq!(report.updated, 2);
        assert_eq!(db.count_media().unwrap(), 2);

        let row = db.get_media("WD8A", "a.mkv").unwrap();
        assert_eq!(row.video_bit_rate, Some(12_500_000));
        assert_eq!(row.formatted_video_bit_rate.as_deref(), Some("12.50 Mbps"));
        assert!(row.full_json.contains("\"volume\":\"WD8A\""));
    }

    #[test]
    fn test_probe_failures_are_collected_and_skipped() {
        let db = Database::open_in_memory().unwrap();
        let root = volume_with(&["a.mkv", "broken.mkv", "c.mkv", "notes.txt"]);
        let prober = FakeProber::new(8_000_000);

        let mut handled = Vec::new();
        let loader = UpsertLoader::new(&db, &prober, "WD8A");
        let files = loader.scan(root.path()).unwrap();
        let report = loader
            .load_files(&files, |p| handled.push(p.to_path_buf()))
            .unwrap();

        assert_eq!(handled.len(), 3);
        assert_eq!(report.scanned, 3);
        assert_eq!(report.ingested, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, root.path().join("broken.mkv"));
        assert_eq!(report.flushes, vec![2]);
    }

    #[test]
    fn test_invalid_settings() {
        let db = Database::open_in_memory().unwrap();
        let root = volume_with(&["a.mkv"]);
        let prober = FakeProber::new(1);

        assert!(matches!(
            UpsertLoader::new(&db, &prober, "WD8A")
                .with_batch_size(0)
                .run(root.path()),
            Err(IngestError::InvalidArgument(_))
        ));
        assert!(matches!(
            UpsertLoader::new(&db, &prober, " ").run(root.path()),
            Err(IngestError::InvalidArgument(_))
        ));
        assert_eq!(db.count_media().unwrap(), 0);
    }
}
