use serde::{Deserialize, Serialize};

use crate::types::{
    Address, Amount, EscrowId, HashAlgorithm, LedgerKind, LedgerTxId, OrderId, Secret, SecretHash,
    Timestamp, TokenId,
};

// ── OrderStatus ──────────────────────────────────────────────────────────────

/// Lifecycle status of a swap order. Forms a DAG; the only reversible edge is
/// `Created -> Failed` (pre-deposit abort).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Created,
    ALocked,
    BothLocked,
    AClaimed,
    BClaimed,
    Completed,
    RefundPending,
    Refunded,
    Failed,
    Expired,
}

impl OrderStatus {
    /// True if the order has reached a terminal status and is eligible for
    /// garbage collection after the retention window.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Refunded
                | OrderStatus::Failed
                | OrderStatus::Expired
        )
    }
}

// ── OrderSide ────────────────────────────────────────────────────────────────

/// One side (ledger) of a swap order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderSide {
    pub ledger: LedgerKind,
    pub initiator: Address,
    pub redeemer: Address,
    pub token: TokenId,
    pub amount: Amount,
    pub timelock: Timestamp,
    pub escrow_id: Option<EscrowId>,
    pub deposit_tx: Option<LedgerTxId>,
    pub claim_tx: Option<LedgerTxId>,
    pub refund_tx: Option<LedgerTxId>,
}

impl OrderSide {
    pub fn new(
        ledger: LedgerKind,
        initiator: Address,
        redeemer: Address,
        token: TokenId,
        amount: Amount,
        timelock: Timestamp,
    ) -> Self {
        Self {
            ledger,
            initiator,
            redeemer,
            token,
            amount,
            timelock,
            escrow_id: None,
            deposit_tx: None,
            claim_tx: None,
            refund_tx: None,
        }
    }
}

// ── Order ────────────────────────────────────────────────────────────────────

/// Binds a pair of escrows (one per ledger) under a single secret.
///
/// Schema version 1. Future fields should be added with `#[serde(default)]`
/// so that records written by older coordinators still deserialize.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub order_id: OrderId,
    /// Held only by the party that originated the order. Redacted (set to
    /// `None`) in any receipt or log emitted after on-chain reveal.
    pub secret: Option<Secret>,
    pub secret_hash: SecretHash,
    pub hash_algorithm: HashAlgorithm,
    pub side_a: OrderSide,
    pub side_b: OrderSide,
    pub partial_fills_allowed: bool,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: OrderStatus,
}

fn default_schema_version() -> u16 {
    1
}

impl Order {
    /// The revealed preimage once observed on-chain, if any.
    pub fn revealed_preimage(&self) -> Option<&Secret> {
        self.secret.as_ref()
    }
}
