//! Public identifier generation.
//!
//! Public IDs are short prefixed strings (`ak_1qjrblb8pm90`) that are safe to
//! expose in URLs and logs. They are not secrets; collisions are improbable
//! rather than impossible, so inserts still rely on the database uniqueness
//! constraint and treat a duplicate as retryable.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 12;

/// Generate a new public ID with the given prefix, e.g. `new("ak")` returns
/// something like `ak_8f3kq0zj2v1m`.
pub fn new(prefix: &str) -> String {
    let mut rng = rand::rng();

    let id: String = (0..ID_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    format!("{prefix}_{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_prefixed_id() {
        let id = new("ak");

        assert!(id.starts_with("ak_"));
        assert_eq!(id.len(), "ak_".len() + ID_LENGTH);
    }

    #[test]
    fn uses_restricted_alphabet() {
        let id = new("ak");
        let suffix = id.strip_prefix("ak_").unwrap();

        assert!(
            suffix
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn successive_ids_differ() {
        assert_ne!(new("ak"), new("ak"));
    }
}
