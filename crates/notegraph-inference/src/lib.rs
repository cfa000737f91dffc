//! # notegraph-inference
//!
//! Embedding backends for notegraph.
//!
//! Note text is embedded on create and update before it reaches the vector
//! store. Two backends are available:
//! - [`ConstantEmbedder`]: fixed placeholder vectors, no external service
//! - [`OllamaEmbedder`]: real embeddings from an Ollama server
//!
//! [`EmbeddingConfig::from_env`] picks one from the environment.

pub mod config;
pub mod ollama;

pub use config::{EmbedderKind, EmbeddingConfig};
pub use notegraph_core::{ConstantEmbedder, EmbeddingBackend, Error, Result};
pub use ollama::OllamaEmbedder;
