//! Embedding backend selection.

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use notegraph_core::defaults::{EMBED_DIMENSION, EMBED_MODEL, EMBED_TIMEOUT_SECS, OLLAMA_URL};
use notegraph_core::{ConstantEmbedder, EmbeddingBackend, Error, Result};

use crate::ollama::OllamaEmbedder;

/// Which embedding backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedderKind {
    /// Placeholder vectors of a constant value.
    #[default]
    Constant,
    /// Ollama `/api/embed`.
    Ollama,
}

impl FromStr for EmbedderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constant" | "placeholder" => Ok(Self::Constant),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::Config(format!(
                "Unknown EMBEDDING_BACKEND '{}' (expected 'constant' or 'ollama')",
                other
            ))),
        }
    }
}

/// Embedding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    pub kind: EmbedderKind,
    pub dimension: usize,
    pub ollama_base: String,
    pub ollama_model: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::default(),
            dimension: EMBED_DIMENSION,
            ollama_base: OLLAMA_URL.to_string(),
            ollama_model: EMBED_MODEL.to_string(),
            timeout_secs: EMBED_TIMEOUT_SECS,
        }
    }
}

impl EmbeddingConfig {
    /// Load from `EMBEDDING_BACKEND`, `EMBEDDING_DIM`, `OLLAMA_BASE`,
    /// `OLLAMA_EMBED_MODEL` and `EMBED_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let kind = match lookup("EMBEDDING_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.kind,
        };
        let dimension = match lookup("EMBEDDING_DIM") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| Error::Config(format!("Invalid EMBEDDING_DIM '{}'", v)))?,
            None => defaults.dimension,
        };
        let timeout_secs = lookup("EMBED_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Ok(Self {
            kind,
            dimension,
            ollama_base: lookup("OLLAMA_BASE").unwrap_or(defaults.ollama_base),
            ollama_model: lookup("OLLAMA_EMBED_MODEL").unwrap_or(defaults.ollama_model),
            timeout_secs,
        })
    }

    /// Construct the configured backend.
    pub fn build(&self) -> Result<Arc<dyn EmbeddingBackend>> {
        let backend: Arc<dyn EmbeddingBackend> = match self.kind {
            EmbedderKind::Constant => Arc::new(ConstantEmbedder::new(self.dimension)),
            EmbedderKind::Ollama => Arc::new(OllamaEmbedder::with_config(
                self.ollama_base.clone(),
                self.ollama_model.clone(),
                self.dimension,
                self.timeout_secs,
            )?),
        };

        info!(
            subsystem = "inference",
            component = "config",
            backend = ?self.kind,
            model = backend.model_name(),
            dimension = backend.dimension(),
            "Embedding backend selected"
        );
        Ok(backend)
    }
}
