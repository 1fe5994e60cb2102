//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] mkvdex_db::DbError),

    #[error("Probe error: {0}")]
    Probe(#[from] mkvdex_process::ProcessError),

    #[error("Record error: {0}")]
    Record(#[from] mkvdex_core::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No media files found under {0}")]
    NoMediaFiles(PathBuf),

    #[error("Invalid file pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
