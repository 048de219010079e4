//! Secret material generation.
//!
//! Everything secret in an API key starts here: raw bytes come from the OS
//! CSPRNG and are encoded with URL-safe base64 so they can travel in headers
//! and identifiers. The generator is a trait so the key service can take it
//! as an injected collaborator and tests can substitute a failing or fixed
//! implementation.

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::AppError;

/// Source of cryptographically random secret material.
pub trait SecretGenerator: Send + Sync {
    /// Generate `n` random bytes from a secure source.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Entropy` if the OS random source is unavailable.
    /// There is no fallback to a non-cryptographic source.
    fn generate_random_bytes(&self, n: usize) -> Result<Vec<u8>, AppError>;

    /// Generate `n` random bytes and encode them as URL-safe base64.
    ///
    /// The output length is a function of `n` (4 characters per 3 bytes,
    /// padded), not `n` itself.
    fn generate_random_string(&self, n: usize) -> Result<String, AppError>;
}

/// `SecretGenerator` backed by the operating system's random source.
pub struct OsSecretGenerator;

impl SecretGenerator for OsSecretGenerator {
    fn generate_random_bytes(&self, n: usize) -> Result<Vec<u8>, AppError> {
        let mut bytes = vec![0u8; n];

        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| AppError::Entropy(err.to_string()))?;

        Ok(bytes)
    }

    fn generate_random_string(&self, n: usize) -> Result<String, AppError> {
        let bytes = self.generate_random_bytes(n)?;

        Ok(URL_SAFE.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generates_requested_byte_count() {
        let generator = OsSecretGenerator;

        let bytes = generator.generate_random_bytes(32).unwrap();

        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn generates_decodable_base64_string() {
        let generator = OsSecretGenerator;

        let encoded = generator.generate_random_string(32).unwrap();
        let decoded = URL_SAFE.decode(&encoded).unwrap();

        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn successive_strings_differ() {
        let generator = OsSecretGenerator;

        let first = generator.generate_random_string(32).unwrap();
        let second = generator.generate_random_string(32).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn no_collisions_across_many_generations() {
        let generator = OsSecretGenerator;
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            assert!(seen.insert(generator.generate_random_string(32).unwrap()));
        }
    }
}
