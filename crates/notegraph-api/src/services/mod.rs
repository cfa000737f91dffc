//! Route-independent service logic.
//!
//! Handlers only translate HTTP to calls on these services; the services only
//! see the capability traits from `notegraph-core`.

pub mod auth;
pub mod notes;

pub use auth::AuthService;
pub use notes::{NoteService, UpdatePolicy};
