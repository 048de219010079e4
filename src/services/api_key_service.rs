//! API key lifecycle service.
//!
//! Owns the three operations on a key: create, validate, revoke. The service
//! combines random material from a `SecretGenerator` with a SHA-512 digest
//! and persists only the derived verifier; the plaintext key is returned to
//! the caller exactly once.
//!
//! # Key anatomy
//!
//! An issued key looks like `sk_<salt>.<secret>` where salt and secret are
//! alphanumeric. The stored credential for that key is
//! `<salt>.<hex(sha512(secret))>`. The salt is a lookup key that lets the
//! store find the record with an exact-match query; it is not an input to
//! the hash.
//!
//! # State machine
//!
//! Active → Revoked, one-way. Validation of a revoked key always fails even
//! though the record still exists.

use std::sync::Arc;

use sha2::{Digest, Sha512};

use crate::{
    error::AppError,
    keygen::SecretGenerator,
    models::api_key::{ApiKeyCreate, IssuedApiKey},
    repository::api_keys::ApiKeyStore,
};

/// Prefix on every issued plaintext key.
pub const KEY_PREFIX: &str = "sk";

/// Raw byte length of the secret portion, before encoding.
const SECRET_BYTES: usize = 64;

/// Raw byte length of the salt portion, before encoding.
const SALT_BYTES: usize = 32;

/// Create / validate / revoke for API keys.
///
/// Stateless apart from its collaborators; clones share the same store and
/// generator, so one instance can serve concurrent requests freely.
#[derive(Clone)]
pub struct ApiKeyService {
    store: Arc<dyn ApiKeyStore>,
    generator: Arc<dyn SecretGenerator>,
}

impl ApiKeyService {
    pub fn new(store: Arc<dyn ApiKeyStore>, generator: Arc<dyn SecretGenerator>) -> Self {
        Self { store, generator }
    }

    /// Issue a new API key under the given label.
    ///
    /// # Process
    ///
    /// 1. Generate the secret and an independent salt
    /// 2. Hash the secret with SHA-512
    /// 3. Persist `{salt.hash, name}` through the store
    /// 4. Hand the plaintext `sk_salt.secret` back to the caller
    ///
    /// The plaintext never touches storage or logs. After this call returns
    /// there is no way to reconstruct it server-side.
    ///
    /// # Errors
    ///
    /// - `Entropy`: the random source failed; nothing was persisted
    /// - `DuplicateCredential`: the store already holds this credential. Not
    ///   retried here; the caller may call again for fresh material
    /// - `Database`: storage failure
    pub async fn create(&self, name: &str) -> Result<IssuedApiKey, AppError> {
        let secret = sanitize(self.generator.generate_random_string(SECRET_BYTES)?);
        let salt = sanitize(self.generator.generate_random_string(SALT_BYTES)?);

        let credential = format!("{salt}.{}", hash_secret(&secret));

        let created = self
            .store
            .create(ApiKeyCreate {
                credential,
                name: name.to_string(),
            })
            .await?;

        Ok(IssuedApiKey {
            public_id: created.public_id,
            name: created.name,
            plaintext_key: format!("{KEY_PREFIX}_{salt}.{secret}"),
            created_at: created.created_at,
        })
    }

    /// Check whether a presented key is currently valid.
    ///
    /// Returns `Ok(false)` for anything that is simply not a valid key:
    /// malformed input, unknown credential, revoked record. Malformed keys
    /// are expected traffic (probing bots), so they are a negative result
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Storage failures propagate as `Err`. A caller gating requests on this
    /// method must treat `Err` as "cannot confirm" and deny; it never means
    /// the key was confirmed valid.
    pub async fn validate(&self, presented_key: &str) -> Result<bool, AppError> {
        let Some((salt, secret)) = parse_presented_key(presented_key) else {
            return Ok(false);
        };

        let candidate = format!("{salt}.{}", hash_secret(secret));

        match self.store.find_by_credential(&candidate).await {
            Ok(api_key) => Ok(!api_key.revoked),
            Err(AppError::ApiKeyNotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Revoke the key with the given public ID.
    ///
    /// Idempotent: revoking an already-revoked key succeeds. Unknown IDs are
    /// `AppError::ApiKeyNotFound`.
    pub async fn revoke(&self, public_id: &str) -> Result<(), AppError> {
        self.store.revoke(public_id).await
    }
}

/// Hex-encoded SHA-512 digest of the secret portion of a key.
fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(secret.as_bytes());

    hex::encode(hasher.finalize())
}

/// Drop base64url artifacts (`-`, `_`, `=`) from generated material.
///
/// The key format uses `_` and `.` as separators, so salt and secret must
/// stay inside `[A-Za-z0-9]`.
fn sanitize(encoded: String) -> String {
    encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Split a presented key into `(salt, secret)` if it matches the wire format
/// `^[a-z]{2}_[A-Za-z0-9]+\.[A-Za-z0-9]+$`. Returns `None` otherwise.
fn parse_presented_key(presented_key: &str) -> Option<(&str, &str)> {
    let (prefix, body) = presented_key.split_once('_')?;

    if prefix.len() != 2 || !prefix.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }

    let (salt, secret) = body.split_once('.')?;

    if salt.is_empty() || !salt.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    if secret.is_empty() || !secret.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    Some((salt, secret))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        keygen::OsSecretGenerator,
        repository::memory::{FailingApiKeyStore, InMemoryApiKeyStore},
    };

    /// Generator that fails from its `fail_after`-th string onward.
    ///
    /// `fail_after: 0` fails on the secret, `fail_after: 1` on the salt.
    struct FlakyGenerator {
        calls: AtomicUsize,
        fail_after: usize,
    }

    impl SecretGenerator for FlakyGenerator {
        fn generate_random_bytes(&self, _n: usize) -> Result<Vec<u8>, AppError> {
            Err(AppError::Entropy("no entropy".to_string()))
        }

        fn generate_random_string(&self, n: usize) -> Result<String, AppError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
                return Err(AppError::Entropy("no entropy".to_string()));
            }

            OsSecretGenerator.generate_random_string(n)
        }
    }

    /// Generator returning the same material every time.
    struct FixedGenerator;

    impl SecretGenerator for FixedGenerator {
        fn generate_random_bytes(&self, n: usize) -> Result<Vec<u8>, AppError> {
            Ok(vec![0xAB; n])
        }

        fn generate_random_string(&self, n: usize) -> Result<String, AppError> {
            Ok("fixedMaterial123".repeat(n / 16 + 1))
        }
    }

    fn service_with_memory_store() -> ApiKeyService {
        ApiKeyService::new(
            Arc::new(InMemoryApiKeyStore::new()),
            Arc::new(OsSecretGenerator),
        )
    }

    fn matches_wire_format(key: &str) -> bool {
        parse_presented_key(key).is_some()
    }

    #[tokio::test]
    async fn created_key_matches_wire_format() {
        let service = service_with_memory_store();

        let issued = service.create("ci-pipeline").await.unwrap();

        assert!(issued.plaintext_key.starts_with("sk_"));
        assert!(matches_wire_format(&issued.plaintext_key));
        assert!(issued.public_id.starts_with("ak_"));
        assert_eq!(issued.name, "ci-pipeline");
    }

    #[tokio::test]
    async fn created_key_validates() {
        let service = service_with_memory_store();

        let issued = service.create("ci-pipeline").await.unwrap();

        assert!(service.validate(&issued.plaintext_key).await.unwrap());
    }

    #[tokio::test]
    async fn mutated_secret_fails_validation() {
        let service = service_with_memory_store();

        let issued = service.create("ci-pipeline").await.unwrap();

        let mut mutated = issued.plaintext_key.clone();
        let last = mutated.pop().unwrap();
        mutated.push(if last == 'a' { 'b' } else { 'a' });

        assert!(!service.validate(&mutated).await.unwrap());
    }

    #[tokio::test]
    async fn truncated_secret_fails_validation() {
        let service = service_with_memory_store();

        let issued = service.create("ci-pipeline").await.unwrap();

        let mut truncated = issued.plaintext_key.clone();
        truncated.pop();

        assert!(!service.validate(&truncated).await.unwrap());
    }

    #[tokio::test]
    async fn revoked_key_fails_validation_while_record_remains() {
        let store = Arc::new(InMemoryApiKeyStore::new());
        let service = ApiKeyService::new(store.clone(), Arc::new(OsSecretGenerator));

        let issued = service.create("ci-pipeline").await.unwrap();
        service.revoke(&issued.public_id).await.unwrap();

        assert!(!service.validate(&issued.plaintext_key).await.unwrap());

        // The record itself is still there, flagged as revoked.
        let body = issued.plaintext_key.strip_prefix("sk_").unwrap();
        let (salt, secret) = body.split_once('.').unwrap();
        let record = store
            .find_by_credential(&format!("{salt}.{}", hash_secret(secret)))
            .await
            .unwrap();

        assert!(record.revoked);
        assert!(record.revoked_at.is_some());
    }

    #[tokio::test]
    async fn malformed_keys_are_a_negative_result_not_an_error() {
        let service = ApiKeyService::new(
            Arc::new(FailingApiKeyStore),
            Arc::new(OsSecretGenerator),
        );

        // The failing store proves none of these reach storage.
        for malformed in [
            "",
            "no-separators",
            "sk_nodotbody",
            "sk_.secret",
            "sk_salt.",
            "s_salt.secret",
            "ske_salt.secret",
            "SK_salt.secret",
            "sk_sa-lt.secret",
            "sk_salt.sec_ret",
            "sk_salt.secret.extra",
        ] {
            assert!(!service.validate(malformed).await.unwrap(), "{malformed:?}");
        }
    }

    #[tokio::test]
    async fn storage_failure_fails_closed() {
        let service = ApiKeyService::new(
            Arc::new(FailingApiKeyStore),
            Arc::new(OsSecretGenerator),
        );

        let result = service.validate("sk_somesalt.somesecret").await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn entropy_failure_on_secret_aborts_create() {
        let service = ApiKeyService::new(
            Arc::new(InMemoryApiKeyStore::new()),
            Arc::new(FlakyGenerator {
                calls: AtomicUsize::new(0),
                fail_after: 0,
            }),
        );

        let result = service.create("ci-pipeline").await;

        assert!(matches!(result, Err(AppError::Entropy(_))));
    }

    #[tokio::test]
    async fn entropy_failure_on_salt_aborts_create() {
        let service = ApiKeyService::new(
            Arc::new(InMemoryApiKeyStore::new()),
            Arc::new(FlakyGenerator {
                calls: AtomicUsize::new(0),
                fail_after: 1,
            }),
        );

        let result = service.create("ci-pipeline").await;

        assert!(matches!(result, Err(AppError::Entropy(_))));
    }

    #[tokio::test]
    async fn duplicate_credential_propagates_without_retry() {
        let service = ApiKeyService::new(
            Arc::new(InMemoryApiKeyStore::new()),
            Arc::new(FixedGenerator),
        );

        service.create("first").await.unwrap();
        let second = service.create("second").await;

        assert!(matches!(second, Err(AppError::DuplicateCredential)));
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let service = service_with_memory_store();

        let issued = service.create("ci-pipeline").await.unwrap();

        service.revoke(&issued.public_id).await.unwrap();
        service.revoke(&issued.public_id).await.unwrap();
    }

    #[tokio::test]
    async fn revoking_unknown_id_is_not_found() {
        let service = service_with_memory_store();

        let result = service.revoke("ak_doesnotexist").await;

        assert!(matches!(result, Err(AppError::ApiKeyNotFound)));
    }

    #[tokio::test]
    async fn consecutive_creates_issue_distinct_keys() {
        let service = service_with_memory_store();

        let first = service.create("one").await.unwrap();
        let second = service.create("two").await.unwrap();

        assert_ne!(first.plaintext_key, second.plaintext_key);
        assert_ne!(first.public_id, second.public_id);
    }

    #[tokio::test]
    async fn full_lifecycle_scenario() {
        let service = service_with_memory_store();

        let issued = service.create("ci-pipeline").await.unwrap();
        assert!(service.validate(&issued.plaintext_key).await.unwrap());

        let altered = format!("{}x", issued.plaintext_key);
        assert!(!service.validate(&altered).await.unwrap());

        service.revoke(&issued.public_id).await.unwrap();
        assert!(!service.validate(&issued.plaintext_key).await.unwrap());
    }

    #[test]
    fn sanitize_strips_encoding_artifacts() {
        assert_eq!(sanitize("ab-cd_ef==".to_string()), "abcdef");
        assert_eq!(sanitize("AZaz09".to_string()), "AZaz09");
    }

    #[test]
    fn parse_accepts_any_two_letter_prefix() {
        assert!(parse_presented_key("pk_salt.secret").is_some());
        assert_eq!(
            parse_presented_key("sk_salt.secret"),
            Some(("salt", "secret"))
        );
    }
}
