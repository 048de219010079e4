//! API key management HTTP handlers.
//!
//! - POST /api/v1/api-keys - Issue a new key
//! - DELETE /api/v1/api-keys/{public_id} - Revoke a key

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    models::api_key::{ApiKeyCreatedResponse, CreateApiKeyRequest},
};

/// Longest accepted key label.
const MAX_NAME_LENGTH: usize = 64;

/// Issue a new API key.
///
/// # Endpoint
///
/// `POST /api/v1/api-keys`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "ci-pipeline"
/// }
/// ```
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "id": "ak_1qjrblb8pm90",
///   "name": "ci-pipeline",
///   "key": "sk_8fK3xQ.aZ91jW3p",
///   "created_at": "2025-07-15T10:00:00Z"
/// }
/// ```
///
/// The `key` field is shown exactly once. The server keeps only a hash and
/// cannot return the plaintext again.
pub async fn create_api_key(
    State(state): State<AppState>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyCreatedResponse>), AppError> {
    let name = request.name.trim();

    if name.is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".into()));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }

    let issued = state.api_keys.create(name).await?;

    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// Revoke an API key by public ID.
///
/// # Endpoint
///
/// `DELETE /api/v1/api-keys/{public_id}`
///
/// # Response
///
/// - **204 No Content**: key revoked (repeat revocations also land here)
/// - **404 Not Found**: no record with that public ID
///
/// Revocation is permanent. The record stays around for auditing, but the
/// key never validates again.
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.api_keys.revoke(&public_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
