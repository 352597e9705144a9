//! Salted one-way password hashing.
//!
//! bcrypt embeds a fresh random salt in every hash, so hashing the same
//! password twice yields different strings while `verify` still matches
//! both. The functions hold no shared state and are safe to call
//! concurrently. Hashing is CPU-expensive on purpose; async callers should
//! run it on a blocking thread (the orchestrator does).

use anyhow::{Context, Result};

/// bcrypt work factor. Fixed so verification cost stays uniform across
/// records.
pub const COST: u32 = 10;

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns an error if the underlying bcrypt computation fails.
pub fn hash(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, COST).context("failed to hash password")
}

/// Verify a plaintext password against a stored hash, recomputing with the
/// salt embedded in the hash.
///
/// # Errors
/// Returns an error if the stored hash is malformed.
pub fn verify(plaintext: &str, hashed: &str) -> Result<bool> {
    bcrypt::verify(plaintext, hashed).context("failed to verify password hash")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_hash_verify_roundtrip() {
        let hashed = hash("Str0ng!Pw").unwrap();
        assert!(verify("Str0ng!Pw", &hashed).unwrap());
        assert!(!verify("Wr0ng!Pw", &hashed).unwrap());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_hashes_are_salted() {
        let first = hash("Str0ng!Pw").unwrap();
        let second = hash("Str0ng!Pw").unwrap();
        assert_ne!(first, second);
        assert!(verify("Str0ng!Pw", &first).unwrap());
        assert!(verify("Str0ng!Pw", &second).unwrap());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_hash_never_equals_plaintext() {
        let hashed = hash("Str0ng!Pw").unwrap();
        assert_ne!(hashed, "Str0ng!Pw");
    }

    #[test]
    fn test_verify_malformed_hash_is_an_error() {
        assert!(verify("Str0ng!Pw", "not-a-bcrypt-hash").is_err());
    }
}
