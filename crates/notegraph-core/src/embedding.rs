//! Placeholder embedding backend.

use async_trait::async_trait;

use crate::defaults::{EMBED_DIMENSION, PLACEHOLDER_EMBED_VALUE};
use crate::error::Result;
use crate::models::Vector;
use crate::traits::EmbeddingBackend;

/// Returns the same constant vector for every input.
///
/// Stands in until a real model is configured; similarity search over these
/// vectors is meaningless.
#[derive(Debug, Clone)]
pub struct ConstantEmbedder {
    dimension: usize,
    value: f32,
}

impl ConstantEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            value: PLACEHOLDER_EMBED_VALUE,
        }
    }
}

impl Default for ConstantEmbedder {
    fn default() -> Self {
        Self::new(EMBED_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingBackend for ConstantEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts
            .iter()
            .map(|_| Vector::from(vec![self.value; self.dimension]))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "constant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_constant_embedder_shape() {
        let embedder = ConstantEmbedder::default();
        let out = embedder
            .embed_texts(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_slice().len(), EMBED_DIMENSION);
        assert!(out[1].as_slice().iter().all(|v| *v == 0.1));
    }

    #[tokio::test]
    async fn test_constant_embedder_empty_input() {
        let embedder = ConstantEmbedder::new(4);
        assert!(embedder.embed_texts(&[]).await.unwrap().is_empty());
        assert_eq!(embedder.dimension(), 4);
    }
}
