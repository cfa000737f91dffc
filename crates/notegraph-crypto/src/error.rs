//! Error types for credential operations.

use thiserror::Error;

/// Credential operation errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signing secret is empty.
    #[error("Signing secret must not be empty")]
    EmptySecret,

    /// Token lifetime is not positive or pushes expiry past the representable range.
    #[error("Invalid token lifetime: {0}")]
    InvalidLifetime(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Stored hash is not a valid PHC string.
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),

    /// Token does not have the compact `header.claims.signature` shape.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token header names an algorithm other than HS256.
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature does not match - wrong key or tampered token.
    #[error("Token signature mismatch")]
    InvalidSignature,

    /// Token expiry has passed.
    #[error("Token expired")]
    TokenExpired,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CryptoError {
    /// Whether this error means the presented token must be rejected.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            CryptoError::MalformedToken(_)
                | CryptoError::UnsupportedAlgorithm(_)
                | CryptoError::InvalidSignature
                | CryptoError::TokenExpired
                | CryptoError::Json(_)
        )
    }
}

impl From<CryptoError> for notegraph_core::Error {
    fn from(err: CryptoError) -> Self {
        if err.is_token_rejection() {
            notegraph_core::Error::Unauthorized(err.to_string())
        } else {
            notegraph_core::Error::Internal(err.to_string())
        }
    }
}

/// Result type for credential operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        for err in [
            CryptoError::InvalidSignature,
            CryptoError::TokenExpired,
            CryptoError::MalformedToken("two segments".to_string()),
            CryptoError::UnsupportedAlgorithm("none".to_string()),
        ] {
            let core: notegraph_core::Error = err.into();
            assert!(matches!(core, notegraph_core::Error::Unauthorized(_)));
        }
    }

    #[test]
    fn test_hashing_errors_map_to_internal() {
        let core: notegraph_core::Error = CryptoError::PasswordHash("oom".to_string()).into();
        assert!(matches!(core, notegraph_core::Error::Internal(_)));

        let core: notegraph_core::Error = CryptoError::EmptySecret.into();
        assert!(matches!(core, notegraph_core::Error::Internal(_)));

        let core: notegraph_core::Error =
            CryptoError::InvalidLifetime("too long".to_string()).into();
        assert!(matches!(core, notegraph_core::Error::Internal(_)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(CryptoError::TokenExpired.to_string(), "Token expired");
        assert_eq!(
            CryptoError::InvalidSignature.to_string(),
            "Token signature mismatch"
        );
    }
}
