use atlock_core::types::{HashAlgorithm, SecretHash};
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use sha2::{Digest, Sha256};

/// Compute the 32-byte blake2b-256 digest of `data`.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2bVar::new(32).expect("32 is a valid blake2b output size");
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher
        .finalize_variable(&mut out)
        .expect("output buffer matches configured size");
    out
}

/// Compute the 32-byte sha-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash a secret under the configured algorithm, producing its [`SecretHash`].
pub fn hash_secret(secret: &[u8; 32], algorithm: HashAlgorithm) -> SecretHash {
    let digest = match algorithm {
        HashAlgorithm::Blake2b256 => blake2b_256(secret),
        HashAlgorithm::Sha256 => sha256(secret),
    };
    SecretHash(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let data = b"atlock";
        assert_eq!(sha256(data), sha256(data));
    }

    #[test]
    fn blake2b_differs_from_sha256() {
        let data = b"atlock";
        assert_ne!(blake2b_256(data), sha256(data));
    }
}
