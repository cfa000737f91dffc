//! HTTP handlers.

pub mod auth;
pub mod notes;
pub mod system;

pub use auth::{login, register};
pub use notes::{create_note, get_note, list_notes, update_note};
pub use system::health_check;
