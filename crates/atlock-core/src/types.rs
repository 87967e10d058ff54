use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in the smallest indivisible unit of the relevant ledger.
pub type Amount = u64;

/// Milliseconds since the Unix epoch, as reported by a ledger's own clock facility.
pub type Timestamp = u64;

// ── LedgerSide ───────────────────────────────────────────────────────────────

/// Which side of a swap a value belongs to. Side A is always the side whose
/// initiator holds the secret and deposits second; side B is claimed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerSide {
    A,
    B,
}

impl fmt::Display for LedgerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerSide::A => write!(f, "A"),
            LedgerSide::B => write!(f, "B"),
        }
    }
}

/// Identifies a concrete ledger kind backing one side of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerKind {
    /// A UTXO/object ledger (L1-style).
    Utxo,
    /// An account-based ledger (L2-style).
    Account,
    /// The deterministic in-memory simulator used for development and tests.
    Simulated,
}

// ── Address / token ──────────────────────────────────────────────────────────

/// An address on some ledger. Opaque to the coordinator; format is
/// ledger-specific and never parsed by core logic.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

/// A token/asset identifier on some ledger. Opaque to the coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Secret / SecretHash ──────────────────────────────────────────────────────

/// 32 uniformly random bytes whose hash is committed on-chain. Never
/// serialized into a log line; only present in a terminal receipt after
/// on-chain reveal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(pub [u8; 32]);

impl Secret {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(redacted)")
    }
}

/// 32-byte output of the configured hash function over a [`Secret`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretHash(pub [u8; 32]);

impl SecretHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes[..32]);
        Ok(Self(arr))
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretHash({}…)", &self.to_hex()[..16])
    }
}

/// Which hash function binds a secret to its hash. Both escrows in one order
/// MUST use the same algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Blake2b256,
    Sha256,
}

// ── OrderId ───────────────────────────────────────────────────────────────────

/// Random 32-byte order identifier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub [u8; 32]);

impl OrderId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes[..32]);
        Ok(Self(arr))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderId({}…)", &self.to_hex()[..16])
    }
}

// ── EscrowId / LedgerTxId ─────────────────────────────────────────────────────

/// Opaque, ledger-assigned identifier for an escrow contract/object.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscrowId(pub String);

impl fmt::Display for EscrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EscrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EscrowId({})", self.0)
    }
}

/// Opaque, ledger-assigned transaction identifier, kept only for provenance.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerTxId(pub String);

impl fmt::Display for LedgerTxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for LedgerTxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerTxId({})", self.0)
    }
}
