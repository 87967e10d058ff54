pub mod hash;
pub mod secret;

pub use hash::{blake2b_256, hash_secret, sha256};
pub use secret::{generate, hash_of, verify};
