//! Error types for mkvdex.

use thiserror::Error;

/// Core error type for record handling.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed probe record: {0}")]
    Structure(String),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidField { field: String, value: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using mkvdex's Error.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
