//! Compare two media trees and copy what one of them is missing.

use crate::error::{IngestError, IngestResult};
use crate::scanner::scan_media_files;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Chunk size used when copying media files.
pub const COPY_BUFFER_SIZE: usize = 1 << 20;

/// Media files present under only one of two roots, as sorted relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub left_only: Vec<PathBuf>,
    pub right_only: Vec<PathBuf>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.left_only.is_empty() && self.right_only.is_empty()
    }
}

fn relative_media_files(root: &Path, extensions: &[String]) -> IngestResult<BTreeSet<PathBuf>> {
    let files = scan_media_files(root, extensions)?;
    let mut relative = BTreeSet::new();
    for path in files {
        let rel = path
            .strip_prefix(root)
            .map_err(|e| IngestError::InvalidArgument(format!("{}: {}", path.display(), e)))?;
        relative.insert(rel.to_path_buf());
    }
    Ok(relative)
}

/// Compare the media files under `left` and `right` by relative path.
///
/// Only names are compared; a file present on both sides with different
/// contents is not reported.
pub fn diff_trees(left: &Path, right: &Path, extensions: &[String]) -> IngestResult<TreeDiff> {
    let left_files = relative_media_files(left, extensions)?;
    let right_files = relative_media_files(right, extensions)?;

    let diff = TreeDiff {
        left_only: left_files.difference(&right_files).cloned().collect(),
        right_only: right_files.difference(&left_files).cloned().collect(),
    };

    info!(
        "{} file(s) only in {}, {} only in {}",
        diff.left_only.len(),
        left.display(),
        diff.right_only.len(),
        right.display()
    );
    Ok(diff)
}

/// Copy `src` to `dst` in [`COPY_BUFFER_SIZE`] chunks.
///
/// `progress` receives the size of each chunk written. Returns the bytes copied.
pub fn copy_file_buffered<F>(src: &Path, dst: &Path, mut progress: F) -> io::Result<u64>
where
    F: FnMut(u64),
{
    let mut reader = File::open(src)?;
    let mut writer = File::create(dst)?;
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
        progress(read as u64);
    }

    writer.flush()?;
    Ok(total)
}

/// Copy each relative path from `source_root` to the same place under `dest_root`.
///
/// Missing parent directories are created. Existing destination files are
/// overwritten. Returns the total bytes copied.
pub fn copy_missing<F>(
    source_root: &Path,
    dest_root: &Path,
    relative: &[PathBuf],
    mut progress: F,
) -> IngestResult<u64>
where
    F: FnMut(u64),
{
    let mut total = 0;
    for rel in relative {
        let src = source_root.join(rel);
        let dst = dest_root.join(rel);
        if !src.is_file() {
            return Err(IngestError::FileNotFound(src));
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!("Copying {} to {}", src.display(), dst.display());
        total += copy_file_buffered(&src, &dst, &mut progress)?;
    }

    info!(
        "Copied {} file(s), {} bytes, into {}",
        relative.len(),
        total,
        dest_root.display()
    );
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mkv() -> Vec<String> {
        vec!["mkv".to_string()]
    }

    fn touch(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_diff_by_relative_path() {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();

        touch(left.path(), "Movies/Alien.mkv", b"a");
        touch(left.path(), "Movies/Heat.mkv", b"h");
        touch(left.path(), "notes.txt", b"n");
        touch(right.path(), "Movies/Alien.mkv", b"different contents");
        touch(right.path(), "Shows/Dark/S01E01.mkv", b"d");
        touch(right.path(), "Heat.mkv", b"moved");

        let diff = diff_trees(left.path(), right.path(), &mkv()).unwrap();
        assert_eq!(diff.left_only, vec![PathBuf::from("Movies/Heat.mkv")]);
        assert_eq!(
            diff.right_only,
            vec![
                PathBuf::from("Heat.mkv"),
                PathBuf::from("Shows/Dark/S01E01.mkv")
            ]
        );
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_identical_trees() {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        touch(left.path(), "a.mkv", b"1");
        touch(right.path(), "a.mkv", b"1");

        assert!(diff_trees(left.path(), right.path(), &mkv()).unwrap().is_empty());
    }

    #[test]
    fn test_copy_file_buffered_reports_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("big.mkv");
        let dst = dir.path().join("copy.mkv");
        let data: Vec<u8> = (0..COPY_BUFFER_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let mut chunks = Vec::new();
        let copied = copy_file_buffered(&src, &dst, |n| chunks.push(n)).unwrap();

        assert_eq!(copied, data.len() as u64);
        assert_eq!(chunks.iter().sum::<u64>(), copied);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }

    #[test]
    fn test_copy_missing_then_trees_match() {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        touch(left.path(), "Movies/Heat.mkv", b"heat");
        touch(left.path(), "Shows/Dark/S01E01.mkv", b"dark");

        let diff = diff_trees(left.path(), right.path(), &mkv()).unwrap();
        let bytes = copy_missing(left.path(), right.path(), &diff.left_only, |_| {}).unwrap();

        assert_eq!(bytes, 8);
        assert_eq!(
            fs::read(right.path().join("Shows/Dark/S01E01.mkv")).unwrap(),
            b"dark"
        );
        assert!(diff_trees(left.path(), right.path(), &mkv()).unwrap().is_empty());
    }

    #[test]
    fn test_copy_missing_source() {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        assert!(matches!(
            copy_missing(left.path(), right.path(), &[PathBuf::from("gone.mkv")], |_| {}),
            Err(IngestError::FileNotFound(_))
        ));
    }
}
