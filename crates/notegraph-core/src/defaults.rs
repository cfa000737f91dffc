//! Centralized default constants for notegraph.
//!
//! Every crate references these instead of defining its own magic numbers.

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Lifetime of an issued access token, in minutes.
pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Token type reported by the token endpoint.
pub const TOKEN_TYPE: &str = "bearer";

/// Signing algorithm carried in the token header.
pub const TOKEN_ALGORITHM: &str = "HS256";

// =============================================================================
// NOTE COLLECTION
// =============================================================================

/// Default collection (table) name for notes.
pub const NOTE_COLLECTION: &str = "notes";

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 100;

/// Maximum content length in characters.
pub const CONTENT_MAX_LEN: usize = 1000;

/// Maximum Google Doc id length in characters.
pub const GOOGLE_DOC_ID_MAX_LEN: usize = 255;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Dimension of the note embedding vector.
pub const EMBED_DIMENSION: usize = 128;

/// Component value of the placeholder embedding.
pub const PLACEHOLDER_EMBED_VALUE: f32 = 0.1;

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default Ollama embedding model.
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SERVER
// =============================================================================

/// Default listen port.
pub const SERVER_PORT: u16 = 8000;

/// Maximum accepted request body (bytes).
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

/// Default requests per rate-limit period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate-limit period (seconds).
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;
