//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from store operations
/// - **Authentication Errors**: Invalid, disabled or missing access keys
/// - **Resource Errors**: Requested key not found
/// - **Conflict Errors**: A key with the same token already exists
/// - **Validation Errors**: Invalid request data
/// - **Upstream Errors**: The proxied lookup API could not be reached or decoded
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Access key is missing, unknown, or disabled.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Requested access key does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Key not found")]
    KeyNotFound,

    /// Another key already carries the same token.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Key already exists")]
    DuplicateKey,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Upstream lookup failed at the network, status or decode level.
    ///
    /// Returns HTTP 502 Bad Gateway when it escapes a handler.
    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidApiKey` → 401 Unauthorized
/// - `KeyNotFound` → 404 Not Found
/// - `DuplicateKey` → 409 Conflict
/// - `InvalidRequest` → 400 Bad Request
/// - `Upstream` → 502 Bad Gateway
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::KeyNotFound => (StatusCode::NOT_FOUND, "key_not_found", self.to_string()),
            AppError::DuplicateKey => (StatusCode::CONFLICT, "duplicate_key", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Upstream(ref msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg.clone()),
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Map a unique-constraint violation to [`AppError::DuplicateKey`], leaving
/// every other database error untouched.
pub fn map_unique_violation(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::DuplicateKey,
        other => AppError::Database(other),
    }
}
