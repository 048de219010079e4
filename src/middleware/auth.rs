//! API key authentication middleware.
//!
//! Gates protected routes on the key lifecycle service:
//! 1. Extract the key from the Authorization header
//! 2. Ask the service to validate it against stored credentials
//! 3. Forward the request on success, reject with 401 otherwise
//!
//! Validation distinguishes "not a valid key" from "could not check".
//! The first is a 401. The second (storage down, for instance) propagates as
//! an internal error, so an outage can never be mistaken for a valid key.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, services::api_key_service::ApiKeyService};

/// API key authentication middleware function.
///
/// Expects the standard bearer scheme:
///
/// ```text
/// Authorization: Bearer sk_<salt>.<secret>
/// ```
pub async fn auth_middleware(
    State(api_keys): State<ApiKeyService>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    let presented_key = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidApiKey)?;

    // Malformed, unknown, and revoked keys all land here as a plain false.
    if !api_keys.validate(presented_key).await? {
        return Err(AppError::InvalidApiKey);
    }

    Ok(next.run(request).await)
}
