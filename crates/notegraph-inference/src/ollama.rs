//! Ollama embedding backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use notegraph_core::defaults::{EMBED_DIMENSION, EMBED_MODEL, EMBED_TIMEOUT_SECS, OLLAMA_URL};
use notegraph_core::{EmbeddingBackend, Error, Result, Vector};

/// Embeddings from an Ollama server's `/api/embed` endpoint.
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Create an embedder with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(
            OLLAMA_URL.to_string(),
            EMBED_MODEL.to_string(),
            EMBED_DIMENSION,
            EMBED_TIMEOUT_SECS,
        )
    }

    /// Create an embedder with custom configuration.
    pub fn with_config(
        base_url: String,
        model: String,
        dimension: usize,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "ollama",
            url = %base_url,
            model = %model,
            dimension,
            "Initializing Ollama embedder"
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OllamaEmbedder {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "ollama", op = "embed_texts", model = %self.model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                result.embeddings.len(),
                texts.len()
            )));
        }
        if let Some(bad) = result.embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(Error::Embedding(format!(
                "Model {} produced {}-dimensional embeddings, expected {}",
                self.model,
                bad.len(),
                self.dimension
            )));
        }

        let vectors: Vec<Vector> = result.embeddings.into_iter().map(Vector::from).collect();
        let elapsed = start.elapsed().as_millis() as u64;

        debug!(
            result_count = vectors.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > 5000 {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let embedder =
            OllamaEmbedder::with_config("http://host:11434/".to_string(), "m".to_string(), 4, 5)
                .unwrap();
        assert_eq!(embedder.base_url, "http://host:11434");
        assert_eq!(embedder.model_name(), "m");
        assert_eq!(embedder.dimension(), 4);
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        // Nothing listens here; an empty batch must not try to connect.
        let embedder =
            OllamaEmbedder::with_config("http://127.0.0.1:9".to_string(), "m".to_string(), 4, 1)
                .unwrap();
        assert!(embedder.embed_texts(&[]).await.unwrap().is_empty());
    }
}
