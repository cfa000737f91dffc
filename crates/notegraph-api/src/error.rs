//! HTTP error mapping.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// Errors returned by handlers and extractors.
#[derive(Debug)]
pub enum ApiError {
    /// 401 with a `WWW-Authenticate: Bearer` challenge.
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    TooManyRequests,
    /// Store, embedding or other unrecoverable failure.
    Internal(notegraph_core::Error),
}

impl From<notegraph_core::Error> for ApiError {
    fn from(err: notegraph_core::Error) -> Self {
        use notegraph_core::Error;

        match err {
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Conflict(msg) | Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(_) => ApiError::NotFound("Note not found".to_string()),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => {
                let body = Json(serde_json::json!({ "error": msg }));
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                    body,
                )
                    .into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please wait before retrying.".to_string(),
            ),
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::INVALID_CREDENTIALS;
    use notegraph_core::Error;

    #[test]
    fn test_core_error_mapping() {
        assert!(matches!(
            ApiError::from(Error::Conflict("dup".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(Error::InvalidInput("long".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(Error::NoteNotFound(3)),
            ApiError::NotFound(msg) if msg == "Note not found"
        ));
        assert!(matches!(
            ApiError::from(Error::Unauthorized("x".into())),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(Error::Embedding("down".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_undecodable_row_is_500() {
        let decode = sqlx::Error::ColumnDecode {
            index: "\"id\"".to_string(),
            source: "mismatched types; Rust type `i64` is not compatible with SQL type `INT4`".into(),
        };
        let response = ApiError::from(Error::Database(decode)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_failure_is_500() {
        let response = ApiError::from(Error::Config("schema mismatch".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
