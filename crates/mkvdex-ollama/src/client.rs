//! Ollama HTTP client.

use crate::error::{OllamaError, OllamaResult};
use crate::types::*;
use mkvdex_config::OllamaConfig;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Longest text sent to the embedding endpoint.
pub const MAX_EMBEDDING_CHARS: usize = 8192;

/// Text to embed for a stored probe record, cut to [`MAX_EMBEDDING_CHARS`].
///
/// The cut always lands on a character boundary.
pub fn embedding_text(full_json: &str) -> &str {
    match full_json.char_indices().nth(MAX_EMBEDDING_CHARS) {
        Some((idx, _)) => &full_json[..idx],
        None => full_json,
    }
}

/// Client for interacting with Ollama's API.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &OllamaConfig) -> OllamaResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OllamaError::Http)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn send_error(&self, e: reqwest::Error) -> OllamaError {
        if e.is_connect() {
            OllamaError::ServerNotRunning {
                host: self.host.clone(),
            }
        } else if e.is_timeout() {
            OllamaError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            OllamaError::Http(e)
        }
    }

    /// Check if Ollama server is available.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List all available models.
    pub async fn list_models(&self) -> OllamaResult<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.host);
        debug!("Listing models from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::ApiError {
                status,
                message: text,
            });
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models)
    }

    /// Check if a specific model is available.
    pub async fn has_model(&self, model: &str) -> OllamaResult<bool> {
        let models = self.list_models().await?;
        // "nomic-embed-text" matches "nomic-embed-text:latest"
        Ok(models
            .iter()
            .any(|m| m.name == model || m.name.starts_with(&format!("{}:", model))))
    }

    /// Generate an embedding for `text`.
    pub async fn embed(&self, model: &str, text: &str) -> OllamaResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.host);
        debug!(
            "Generating embedding with model {} for text length {}",
            model,
            text.len()
        );

        let request = EmbeddingRequest {
            model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let response = check_status(response, model).await?;
        let embedding_response: EmbeddingResponse = response.json().await?;

        if embedding_response.embedding.is_empty() {
            return Err(OllamaError::EmptyEmbedding {
                model: model.to_string(),
            });
        }
        Ok(embedding_response.embedding)
    }
}

async fn check_status(response: Response, model: &str) -> OllamaResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    if text.contains("not found") || status.as_u16() == 404 {
        return Err(OllamaError::ModelNotFound {
            model: model.to_string(),
        });
    }

    Err(OllamaError::ApiError {
        status: status.as_u16(),
        message: text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = OllamaConfig::default();
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = OllamaConfig {
            host: "http://gpu-box:11434/".to_string(),
            ..Default::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.host(), "http://gpu-box:11434");
    }

    #[test]
    fn test_embedding_text_is_cut_on_char_boundary() {
        assert_eq!(embedding_text("{\"media\":{}}"), "{\"media\":{}}");

        let long = "é".repeat(MAX_EMBEDDING_CHARS + 10);
        let cut = embedding_text(&long);
        assert_eq!(cut.chars().count(), MAX_EMBEDDING_CHARS);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Port 9 (discard) is not an Ollama server
        let config = OllamaConfig {
            host: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..Default::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();

        assert!(!client.is_available().await);
        assert!(client.list_models().await.is_err());
    }

    #[test]
    fn test_embedding_response_shape() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"embedding":[0.5,-1.25,3.0]}"#).unwrap();
        assert_eq!(response.embedding, vec![0.5, -1.25, 3.0]);

        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"nomic-embed-text:latest","size":274302450,"digest":"0a109f"}]}"#,
        )
        .unwrap();
        assert_eq!(tags.models[0].name, "nomic-embed-text:latest");
        assert_eq!(tags.models[0].size, 274302450);

        let body = serde_json::to_string(&EmbeddingRequest {
            model: "nomic-embed-text",
            prompt: "HEVC",
        })
        .unwrap();
        assert_eq!(body, r#"{"model":"nomic-embed-text","prompt":"HEVC"}"#);
    }
}
