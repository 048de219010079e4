//! API key data models and request/response types.
//!
//! This module defines:
//! - `ApiKey`: database entity for a key record
//! - `ApiKeyCreate`: the fields the lifecycle service hands to the store
//! - `IssuedApiKey`: creation result carrying the one-time plaintext key
//! - `CreateApiKeyRequest` / `ApiKeyCreatedResponse`: HTTP body types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table. The `credential` column holds
/// `"<salt>.<hex(sha512(secret))>"`; the plaintext secret is never stored.
/// The state machine per record is Active → Revoked, one-way.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// Internal sequential identifier, never exposed outside the service
    pub id: i32,

    /// External identifier (`ak_` + 12 chars), safe to log and put in URLs
    pub public_id: String,

    /// Human-readable label supplied at creation, no uniqueness constraint
    pub name: String,

    /// Stored verifier, format `salt.hash`
    ///
    /// The salt prefix routes lookups; the hash is a hex-encoded SHA-512
    /// digest of the secret portion of the issued key.
    pub credential: String,

    /// Whether this key has been revoked
    ///
    /// Once true it never goes back to false. Validation checks this flag
    /// explicitly, so a revoked record that still matches a credential is
    /// rejected.
    pub revoked: bool,

    /// When the key was revoked, stamped on the first revocation only
    pub revoked_at: Option<DateTime<Utc>>,

    /// Timestamp when this key was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last record update
    pub updated_at: DateTime<Utc>,
}

/// Fields persisted when creating a key record.
///
/// The store fills in `public_id` and timestamps itself.
#[derive(Debug, Clone)]
pub struct ApiKeyCreate {
    /// Verifier string, `salt.hash`
    pub credential: String,

    /// Caller-supplied label
    pub name: String,
}

/// Result of issuing a new API key.
///
/// `plaintext_key` is the only copy of the secret that will ever exist; it is
/// returned to the caller once and cannot be reconstructed from stored state.
#[derive(Debug)]
pub struct IssuedApiKey {
    pub public_id: String,
    pub name: String,
    pub plaintext_key: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a new API key.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "ci-pipeline"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    /// Label for the new key
    pub name: String,
}

/// Response body for key creation.
///
/// # JSON Example
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
/// `key` is the one-time plaintext. Clients must store it; it is not
/// retrievable again through any endpoint.
#[derive(Debug, Serialize)]
pub struct ApiKeyCreatedResponse {
    /// Public identifier of the key record
    pub id: String,

    /// Key label
    pub name: String,

    /// One-time plaintext key
    pub key: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<IssuedApiKey> for ApiKeyCreatedResponse {
    fn from(issued: IssuedApiKey) -> Self {
        Self {
            id: issued.public_id,
            name: issued.name,
            key: issued.plaintext_key,
            created_at: issued.created_at,
        }
    }
}
