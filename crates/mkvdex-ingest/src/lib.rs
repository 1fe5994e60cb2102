//! Mkvdex Ingest - Getting probe data into the catalogue and back out.
//!
//! This crate provides:
//! - Media file scanning
//! - Probe dumps and normalized delimited dumps
//! - Destructive bulk load of normalized dumps
//! - Batched upsert straight from the probe tool
//! - CSV export and media tree comparison

mod dump;
mod error;
mod export;
mod scanner;
mod store_loader;
mod tree_diff;
mod upsert;

pub use dump::{
    backup_path, read_normalized_dump, write_normalized_dump, write_probe_dump, DumpReport,
    NormalizedRows, ProbeDumpReport, DEFAULT_DELIMITER, DEFAULT_DUMP_SUFFIX,
};
pub use error::{IngestError, IngestResult};
pub use export::{export_csv, export_csv_file};
pub use scanner::{has_media_extension, scan_media_files};
pub use store_loader::{find_dump_files, load_summary_tables, LoadReport};
pub use tree_diff::{copy_file_buffered, copy_missing, diff_trees, TreeDiff, COPY_BUFFER_SIZE};
pub use upsert::{UpsertLoader, UpsertReport, DEFAULT_BATCH_SIZE};
