//! # notegraph-api
//!
//! HTTP service for notegraph: token issuance, user registration and
//! authenticated note CRUD over a vector-store collection.
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | POST | `/token` | none (form: username, password) |
//! | POST | `/users?password=...` | none (JSON user) |
//! | POST, GET | `/notes` | bearer |
//! | GET, PUT | `/notes/{id}` | bearer |
//! | GET | `/health`, `/openapi.json`, `/docs` | none |

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

pub use bootstrap::build_state;
pub use config::{AllowedOrigins, ApiConfig, NoteStoreKind};
pub use error::ApiError;
pub use routes::build_router;
pub use services::{AuthService, NoteService, UpdatePolicy};
pub use state::AppState;
