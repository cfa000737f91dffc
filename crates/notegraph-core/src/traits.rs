//! Core traits for notegraph abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, so route logic never depends on a particular store,
//! hashing scheme, token algorithm or embedding model.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// STORES
// =============================================================================

/// Process-wide table of registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by username.
    async fn get(&self, username: &str) -> Result<Option<UserInDb>>;

    /// Insert a new user.
    ///
    /// Fails with `Error::Conflict` if the username is already present; the
    /// check and the insert happen atomically.
    async fn insert(&self, user: UserInDb) -> Result<()>;

    /// Check if a username is registered.
    async fn contains(&self, username: &str) -> Result<bool>;
}

/// Vector-store collection holding notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persist a note; the store assigns the id.
    async fn insert(&self, record: NoteRecord) -> Result<NoteInDb>;

    /// Every note in the collection.
    async fn list(&self) -> Result<Vec<NoteInDb>>;

    /// Fetch a note by id.
    async fn fetch(&self, id: i64) -> Result<Option<NoteInDb>>;

    /// Overwrite the fields of the note with the given id.
    ///
    /// Returns the number of records matched. Zero matches is not an error.
    async fn update(&self, id: i64, record: NoteRecord) -> Result<u64>;

    /// Check if a note exists.
    async fn exists(&self, id: i64) -> Result<bool>;
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Salted one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, hashed: &str) -> Result<bool>;
}

/// Issues signed, time-limited access tokens.
pub trait TokenSigner: Send + Sync {
    /// Sign a token for `subject` expiring after the signer's lifetime.
    fn sign(&self, subject: &str) -> Result<String>;
}

/// Validates access tokens.
pub trait TokenVerifier: Send + Sync {
    /// Decode a token, checking signature and expiry.
    ///
    /// Any failure is reported as `Error::Unauthorized`.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}

// =============================================================================
// EMBEDDINGS
// =============================================================================

/// Backend for vector embedding generation.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
