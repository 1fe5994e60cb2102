//! Error types for media probing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for probing operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors that can occur while probing one file.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Tool not found: {tool}. Please install it.")]
    ToolNotFound { tool: String },

    #[error("Process failed with exit code {code}: {stderr}")]
    ProcessFailed { code: i32, stderr: String },

    #[error("Probe of {path} timed out after {seconds}s")]
    Timeout { path: PathBuf, seconds: u64 },

    #[error("Parse error: {0}")]
    ParseError(String),
}
