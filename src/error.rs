//! Error types and HTTP error response handling.
//!
//! A single application error enum covers the whole service. Variants fall
//! into the taxonomy the key lifecycle relies on:
//!
//! - **Input errors** (`InvalidRequest`): bad request bodies, HTTP 400.
//! - **Auth errors** (`InvalidApiKey`): missing or failed credentials, 401.
//!   Malformed presented keys are a normal negative validation result and
//!   never become an error on their own; the middleware turns the negative
//!   result into this variant.
//! - **Not-found errors** (`ApiKeyNotFound`): unknown public ID on revoke, or
//!   an absent credential inside the store adapter, 404 at the HTTP surface.
//! - **Infrastructure errors** (`Database`, `Entropy`): propagated, mapped to
//!   a generic 500 body that leaks no internal detail.
//! - **Integrity errors** (`DuplicateCredential`): credential uniqueness
//!   violation on create. Astronomically unlikely with 64-byte secrets; the
//!   caller decides whether to retry with fresh material.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The OS random source could not produce secret material.
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    /// A freshly generated credential collided with a stored one.
    #[error("Generated credential already exists")]
    DuplicateCredential,

    /// API key is missing, malformed, revoked, or unknown.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// No API key record exists for the given public ID.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert `AppError` into an HTTP response.
///
/// All errors serialize as:
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Infrastructure and integrity errors collapse into one opaque 500 body so
/// the HTTP surface never exposes storage or entropy internals.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::ApiKeyNotFound => {
                (StatusCode::NOT_FOUND, "api_key_not_found", self.to_string())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) | AppError::Entropy(_) | AppError::DuplicateCredential => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
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
