use atlock_core::types::{HashAlgorithm, Secret, SecretHash};
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::hash::hash_secret;

/// Generate a fresh 32-byte secret from a cryptographically secure RNG.
/// Generation failure has no recoverable path and is treated as fatal by
/// callers (there is no API-level error for it).
pub fn generate() -> Secret {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Secret(bytes)
}

/// Compute the secret hash of `secret` under `algorithm`.
pub fn hash_of(secret: &Secret, algorithm: HashAlgorithm) -> SecretHash {
    hash_secret(&secret.0, algorithm)
}

/// Constant-time check that `preimage` hashes to `expected_hash` under
/// `algorithm`. Never branches on the preimage's content.
pub fn verify(preimage: &[u8; 32], expected_hash: &SecretHash, algorithm: HashAlgorithm) -> bool {
    let computed = hash_secret(preimage, algorithm);
    computed.as_bytes().ct_eq(expected_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secret_verifies_against_its_own_hash() {
        for algorithm in [HashAlgorithm::Blake2b256, HashAlgorithm::Sha256] {
            let secret = generate();
            let hash = hash_of(&secret, algorithm);
            assert!(verify(secret.as_bytes(), &hash, algorithm));
        }
    }

    #[test]
    fn wrong_preimage_fails_verification() {
        let secret = generate();
        let hash = hash_of(&secret, HashAlgorithm::Sha256);
        let wrong = [0xAAu8; 32];
        assert!(!verify(&wrong, &hash, HashAlgorithm::Sha256));
    }

    #[test]
    fn two_generated_secrets_differ() {
        let a = generate();
        let b = generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
