//! In-memory `ApiKeyStore` implementations for tests.
//!
//! `InMemoryApiKeyStore` mirrors the PostgreSQL adapter's behavior closely
//! enough to exercise the full lifecycle: credential uniqueness, public ID
//! assignment, and idempotent revocation. `FailingApiKeyStore` simulates an
//! unreachable database for fail-closed tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    error::AppError,
    models::api_key::{ApiKey, ApiKeyCreate},
    publicid,
    repository::api_keys::ApiKeyStore,
};

/// HashMap-grade store keeping records in a `Mutex<Vec<_>>`.
#[derive(Default)]
pub struct InMemoryApiKeyStore {
    keys: Mutex<Vec<ApiKey>>,
}

impl InMemoryApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn create(&self, new_key: ApiKeyCreate) -> Result<ApiKey, AppError> {
        let mut keys = self.keys.lock().unwrap();

        if keys.iter().any(|key| key.credential == new_key.credential) {
            return Err(AppError::DuplicateCredential);
        }

        let now = Utc::now();
        let api_key = ApiKey {
            id: keys.len() as i32 + 1,
            public_id: publicid::new("ak"),
            name: new_key.name,
            credential: new_key.credential,
            revoked: false,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        };

        keys.push(api_key.clone());

        Ok(api_key)
    }

    async fn find_by_credential(&self, credential: &str) -> Result<ApiKey, AppError> {
        let keys = self.keys.lock().unwrap();

        keys.iter()
            .find(|key| key.credential == credential)
            .cloned()
            .ok_or(AppError::ApiKeyNotFound)
    }

    async fn revoke(&self, public_id: &str) -> Result<(), AppError> {
        let mut keys = self.keys.lock().unwrap();

        let key = keys
            .iter_mut()
            .find(|key| key.public_id == public_id)
            .ok_or(AppError::ApiKeyNotFound)?;

        key.revoked = true;
        key.revoked_at.get_or_insert_with(Utc::now);
        key.updated_at = Utc::now();

        Ok(())
    }
}

/// Store whose every operation fails like a closed connection pool.
pub struct FailingApiKeyStore;

#[async_trait]
impl ApiKeyStore for FailingApiKeyStore {
    async fn create(&self, _new_key: ApiKeyCreate) -> Result<ApiKey, AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }

    async fn find_by_credential(&self, _credential: &str) -> Result<ApiKey, AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }

    async fn revoke(&self, _public_id: &str) -> Result<(), AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }
}
