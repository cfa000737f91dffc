//! # notegraph-db
//!
//! Storage layer for notegraph.
//!
//! This crate provides:
//! - Connection pool management for the PostgreSQL + pgvector vector store
//! - [`PgNoteStore`], the note collection backed by a pgvector table
//! - [`InMemoryNoteStore`], a process-local collection for tests and development
//! - [`InMemoryUserStore`], the process-lifetime user table
//!
//! ## Example
//!
//! ```rust,ignore
//! use notegraph_db::{create_pool, PgNoteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/notegraph").await?;
//!     let notes = PgNoteStore::new(pool, "notes", 128)?;
//!     notes.ensure_collection().await?;
//!     println!("{} notes", notes.list().await?.len());
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod notes;
pub mod pool;
pub mod users;
pub mod validation;

// Re-export core types
pub use notegraph_core::*;

pub use memory::InMemoryNoteStore;
pub use notes::PgNoteStore;
pub use pool::{create_pool, create_pool_with_config, create_pool_with_options, PoolConfig};
pub use users::InMemoryUserStore;
pub use validation::validate_collection_name;
