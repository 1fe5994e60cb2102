//! Mkvdex Ollama - Embeddings for semantic search over probe records.
//!
//! This crate provides an async client for Ollama's model listing and
//! embedding endpoints.

mod client;
mod error;
mod types;

pub use client::{embedding_text, OllamaClient, MAX_EMBEDDING_CHARS};
pub use error::{OllamaError, OllamaResult};
pub use types::*;
