//! # notegraph-core
//!
//! Core types, traits, and abstractions for the notegraph service.
//!
//! This crate provides the foundational data structures and the capability
//! interfaces (stores, password hashing, token signing, embeddings) that the
//! other notegraph crates implement or depend on.

pub mod defaults;
pub mod embedding;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use embedding::ConstantEmbedder;
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
