use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"error": "...", "code": "NOT_FOUND"}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"error": "session 'abc' not found", "code": "NOT_FOUND"}
/// ```
///
/// Server-side failures (`Unavailable`, `Storage`, `Internal`) never echo
/// their detail to the client: the response carries a generic message and
/// the detail goes to the log.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Referenced entity does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Input data is missing or out of range. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// The durable store could not be reached. HTTP 500.
    #[error("{0}")]
    Unavailable(String),

    /// Storage backend failure while executing a statement. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Unavailable(_) => error_code::STORE_UNAVAILABLE,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unavailable(_)
            | ServiceError::Storage(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to hand to the client.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::NotFound(msg) | ServiceError::Validation(msg) => msg.clone(),
            ServiceError::Unavailable(_) => "database unavailable".to_string(),
            ServiceError::Storage(_) => "database operation failed".to_string(),
            ServiceError::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "request failed: {}", self);
        }
        let body = serde_json::json!({
            "error": self.public_message(),
            "code": self.error_code(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unavailable("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::Validation("x".into()).error_code(), "VALIDATION_FAILED");
        assert_eq!(ServiceError::Unavailable("x".into()).error_code(), "STORE_UNAVAILABLE");
        assert_eq!(ServiceError::Storage("x".into()).error_code(), "STORAGE_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[test]
    fn server_errors_hide_detail() {
        let err = ServiceError::Storage("no such table: readings".into());
        assert_eq!(err.public_message(), "database operation failed");
        let err = ServiceError::Unavailable("unable to open database file".into());
        assert!(!err.public_message().contains("open"));
    }

    #[test]
    fn client_errors_keep_message() {
        let err = ServiceError::Validation("angle must be between 0 and 180".into());
        assert_eq!(err.public_message(), "angle must be between 0 and 180");
        assert_eq!(ServiceError::NotFound("session 42".into()).to_string(), "session 42");
    }

    #[test]
    fn json_response_format() {
        let err = ServiceError::NotFound("session 'abc' not found".into());
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
