//! Error types for Ollama operations.

use thiserror::Error;

/// Errors that can occur when talking to Ollama.
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("No answer from Ollama within {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Model not found: {model}. Run 'ollama pull {model}' to download it.")]
    ModelNotFound { model: String },

    #[error("Ollama server is not running at {host}. Start it with 'ollama serve'.")]
    ServerNotRunning { host: String },

    /// Non-success status other than a missing model.
    #[error("Ollama returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Model {model} returned an empty embedding")]
    EmptyEmbedding { model: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Ollama operations.
pub type OllamaResult<T> = Result<T, OllamaError>;
