//! Recursive media file discovery.

use crate::error::{IngestError, IngestResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Whether the file's extension is one of `extensions` (case-insensitive, no dot).
pub fn has_media_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// All media files under `root`, sorted by path.
///
/// Hidden files are skipped. Unreadable entries are logged and skipped.
pub fn scan_media_files(root: &Path, extensions: &[String]) -> IngestResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(IngestError::FileNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || is_hidden(path) {
            continue;
        }

        if has_media_extension(path, extensions) {
            files.push(path.to_path_buf());
        } else {
            debug!("Skipping non-media file: {:?}", path);
        }
    }

    files.sort();
    Ok(files)
}
