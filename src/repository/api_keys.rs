//! API key record store.
//!
//! `ApiKeyStore` is the storage contract the key lifecycle service depends
//! on. `PostgresApiKeyStore` implements it against the `api_keys` table. The
//! adapter assigns public IDs and timestamps itself and translates database
//! errors into application errors before they leave this module.

use async_trait::async_trait;

use crate::{
    db::DbPool,
    error::AppError,
    models::api_key::{ApiKey, ApiKeyCreate},
    publicid,
};

/// Prefix for API key public identifiers.
const PUBLIC_ID_PREFIX: &str = "ak";

/// Storage contract for API key records.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Persist a new key record.
    ///
    /// The store assigns `public_id` and timestamps. A uniqueness violation
    /// on the credential column surfaces as `AppError::DuplicateCredential`
    /// so the caller can decide whether to retry with fresh material.
    async fn create(&self, new_key: ApiKeyCreate) -> Result<ApiKey, AppError>;

    /// Look up a record by its exact credential string (`salt.hash`).
    ///
    /// Returns `AppError::ApiKeyNotFound` when absent. Revoked records are
    /// returned as-is; revocation is the caller's check.
    async fn find_by_credential(&self, credential: &str) -> Result<ApiKey, AppError>;

    /// Mark the record with the given public ID as revoked.
    ///
    /// Idempotent for already-revoked records; `revoked_at` keeps its
    /// original value. Returns `AppError::ApiKeyNotFound` for unknown IDs.
    async fn revoke(&self, public_id: &str) -> Result<(), AppError>;
}

/// PostgreSQL-backed `ApiKeyStore`.
pub struct PostgresApiKeyStore {
    pool: DbPool,
}

impl PostgresApiKeyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyStore for PostgresApiKeyStore {
    async fn create(&self, new_key: ApiKeyCreate) -> Result<ApiKey, AppError> {
        // Collision-free with overwhelming probability; the unique constraint
        // on public_id is the backstop.
        let public_id = publicid::new(PUBLIC_ID_PREFIX);

        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (public_id, name, credential)
            VALUES ($1, $2, $3)
            RETURNING id, public_id, name, credential, revoked, revoked_at, created_at, updated_at
            "#,
        )
        .bind(&public_id)
        .bind(&new_key.name)
        .bind(&new_key.credential)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(api_key)
    }

    async fn find_by_credential(&self, credential: &str) -> Result<ApiKey, AppError> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, public_id, name, credential, revoked, revoked_at, created_at, updated_at
            FROM api_keys
            WHERE credential = $1
            "#,
        )
        .bind(credential)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|err| tracing::error!("Failed to query api key by credential: {err}"))?
        .ok_or(AppError::ApiKeyNotFound)?;

        Ok(api_key)
    }

    async fn revoke(&self, public_id: &str) -> Result<(), AppError> {
        // COALESCE keeps the original revoked_at on repeat revocations.
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET revoked = TRUE,
                revoked_at = COALESCE(revoked_at, NOW()),
                updated_at = NOW()
            WHERE public_id = $1
            "#,
        )
        .bind(public_id)
        .execute(&self.pool)
        .await
        .inspect_err(|err| tracing::error!("Failed to revoke api key: {err}"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ApiKeyNotFound);
        }

        Ok(())
    }
}

/// Translate an insert failure, picking out the credential uniqueness
/// violation from everything else.
fn map_insert_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() && db_err.constraint() == Some("api_keys_credential_key") {
            return AppError::DuplicateCredential;
        }
    }

    tracing::error!("Failed to insert api key: {err}");
    AppError::Database(err)
}
