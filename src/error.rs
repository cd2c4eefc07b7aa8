//! Boundary error taxonomy.
//!
//! Every failure a handler can report maps to one of these variants and is
//! surfaced as `{"error": "..."}` JSON. Nothing here is retried and nothing
//! is fatal to the process; the store stays consistent either way.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The referenced session does not exist (or has expired).
    #[error("{0}")]
    NotFound(String),

    /// Wrong HTTP verb for the path.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn missing_session() -> Self {
        Self::Validation("Missing session".to_string())
    }

    pub fn session_not_found() -> Self {
        Self::NotFound("Session not found".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::missing_session().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::session_not_found().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_error_message_text() {
        assert_eq!(ApiError::missing_session().to_string(), "Missing session");
        assert_eq!(
            ApiError::session_not_found().to_string(),
            "Session not found"
        );
    }
}
