//! Data models for users, tokens and notes.

use serde::{Deserialize, Serialize};

use crate::defaults::{CONTENT_MAX_LEN, GOOGLE_DOC_ID_MAX_LEN, TITLE_MAX_LEN, TOKEN_TYPE};
use crate::error::{Error, Result};

pub use pgvector::Vector;

// =============================================================================
// USERS
// =============================================================================

/// Public view of a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct User {
    pub username: String,
    pub email: String,
}

/// A user as held by the user store.
///
/// Only the salted hash is kept; the plaintext password never reaches the store.
#[derive(Clone, PartialEq, Eq)]
pub struct UserInDb {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

impl UserInDb {
    /// Public view without the password hash.
    pub fn to_user(&self) -> User {
        User {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

impl std::fmt::Debug for UserInDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInDb")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("hashed_password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// Claims embedded in a signed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username).
    pub sub: String,
    /// Absolute expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    /// Wrap a signed token as a bearer credential.
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// Note payload accepted by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub google_doc_id: Option<String>,
}

impl Note {
    /// Check the bounded-length fields against the collection schema.
    pub fn validate(&self) -> Result<()> {
        check_len("title", &self.title, TITLE_MAX_LEN)?;
        check_len("content", &self.content, CONTENT_MAX_LEN)?;
        if let Some(doc_id) = &self.google_doc_id {
            check_len("google_doc_id", doc_id, GOOGLE_DOC_ID_MAX_LEN)?;
        }
        Ok(())
    }

    /// Text fed to the embedding backend.
    pub fn embedding_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }

    /// Attach a store-assigned id.
    pub fn with_id(self, id: i64) -> NoteInDb {
        NoteInDb {
            id,
            title: self.title,
            content: self.content,
            google_doc_id: self.google_doc_id,
        }
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::InvalidInput(format!(
            "{} exceeds {} characters ({})",
            field, max, len
        )));
    }
    Ok(())
}

/// A stored note as returned by the API (the embedding is not exposed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteInDb {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub google_doc_id: Option<String>,
}

/// A note together with its computed embedding, ready for the store.
#[derive(Debug, Clone)]
pub struct NoteRecord {
    pub note: Note,
    pub embedding: Vector,
}

impl NoteRecord {
    pub fn new(note: Note, embedding: Vector) -> Self {
        Self { note, embedding }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str, content: &str) -> Note {
        Note {
            title: title.to_string(),
            content: content.to_string(),
            google_doc_id: None,
        }
    }

    #[test]
    fn test_note_validate_accepts_bounds() {
        let n = note(&"t".repeat(TITLE_MAX_LEN), &"c".repeat(CONTENT_MAX_LEN));
        assert!(n.validate().is_ok());
    }

    #[test]
    fn test_note_validate_rejects_long_title() {
        let n = note(&"t".repeat(TITLE_MAX_LEN + 1), "body");
        match n.validate() {
            Err(Error::InvalidInput(msg)) => assert!(msg.starts_with("title")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_note_validate_counts_chars_not_bytes() {
        // 100 multi-byte characters are still within the title limit
        let n = note(&"é".repeat(TITLE_MAX_LEN), "body");
        assert!(n.validate().is_ok());
    }

    #[test]
    fn test_note_validate_rejects_long_doc_id() {
        let mut n = note("title", "body");
        n.google_doc_id = Some("d".repeat(GOOGLE_DOC_ID_MAX_LEN + 1));
        assert!(matches!(n.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_note_deserialize_without_doc_id() {
        let n: Note = serde_json::from_str(r#"{"title":"a","content":"b"}"#).unwrap();
        assert_eq!(n.google_doc_id, None);
    }

    #[test]
    fn test_note_in_db_serializes_null_doc_id() {
        let stored = note("a", "b").with_id(7);
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json["google_doc_id"].is_null());
    }

    #[test]
    fn test_user_in_db_debug_redacts_hash() {
        let user = UserInDb {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
        };
        let debug = format!("{:?}", user);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn test_access_token_bearer() {
        let token = AccessToken::bearer("abc".to_string());
        assert_eq!(token.token_type, "bearer");
    }
}
