//! Collection name validation.
//!
//! The collection name is interpolated into DDL and queries, so it must be a
//! plain PostgreSQL identifier.

use notegraph_core::{Error, Result};

/// Validate a collection (table) name.
///
/// Names must be 1-48 characters of ASCII letters, digits and underscores,
/// not start with a digit, and not be a reserved word.
///
/// ```
/// use notegraph_db::validate_collection_name;
///
/// assert!(validate_collection_name("notes").is_ok());
/// assert!(validate_collection_name("notes_v2").is_ok());
/// assert!(validate_collection_name("2notes").is_err());
/// assert!(validate_collection_name("notes; DROP TABLE users").is_err());
/// ```
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config(
            "Collection name cannot be empty".to_string(),
        ));
    }

    // Leaves room for the "_embedding_hnsw" index suffix within 63 bytes.
    if name.len() > 48 {
        return Err(Error::Config(format!(
            "Collection name exceeds 48 character limit: {} characters",
            name.len()
        )));
    }

    if let Some(first) = name.chars().next() {
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::Config(format!(
                "Collection name must start with a letter or underscore, found: '{}'",
                first
            )));
        }
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(Error::Config(format!(
                "Collection name contains invalid character: '{}'",
                ch
            )));
        }
    }

    const RESERVED: &[&str] = &[
        "select", "insert", "update", "delete", "drop", "table", "user", "where", "from",
        "order", "group",
    ];
    if RESERVED.contains(&name.to_lowercase().as_str()) {
        return Err(Error::Config(format!(
            "Collection name cannot be a reserved word: '{}'",
            name
        )));
    }

    Ok(())
}
