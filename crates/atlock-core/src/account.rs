//! Escrow data structures shared between the state machine, the adapter
//! interface, and the record store.
//!
//! This module defines:
//! - [`EscrowStatus`] — the three-state lifecycle of a single HTLC escrow
//! - [`Escrow`] — the full state of one escrow as held by the in-memory
//!   shadow / simulator ledger

use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, EscrowId, LedgerTxId, SecretHash, Timestamp};

// ── EscrowStatus ─────────────────────────────────────────────────────────────

/// Status of a single-side HTLC escrow.
///
/// `OPEN → FULLY_CLAIMED` via one or more `claim`s, or `OPEN → REFUNDED` via
/// `refund`. No transition leaves a terminal state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EscrowStatus {
    Open,
    FullyClaimed,
    Refunded,
}

impl EscrowStatus {
    /// True if the escrow is in a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscrowStatus::FullyClaimed | EscrowStatus::Refunded)
    }
}

// ── Escrow ───────────────────────────────────────────────────────────────────

/// Full state of one HTLC escrow on one ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Escrow {
    pub escrow_id: EscrowId,
    pub initiator: Address,
    pub redeemer: Address,
    pub secret_hash: SecretHash,
    /// Original deposited amount. Never changes after construction.
    pub deposited: Amount,
    /// Balance still held. Invariant: `claimed_total + remaining == deposited`.
    pub remaining: Amount,
    /// Monotonically increasing sum of all successful claims.
    pub claimed_total: Amount,
    /// Absolute deadline (on this ledger's own clock) past which refund is legal.
    pub timelock: Timestamp,
    pub partial_fills_allowed: bool,
    pub status: EscrowStatus,
    pub ledger_tx_deposit: LedgerTxId,
    /// Transaction ids of every successful claim, in order.
    pub ledger_tx_claims: Vec<LedgerTxId>,
    pub ledger_tx_refund: Option<LedgerTxId>,
    /// Preimage revealed by the most recent successful claim, as parsed from
    /// that transaction's emitted event. `None` until the first claim.
    pub revealed_preimage: Option<[u8; 32]>,
}

impl Escrow {
    /// True iff the core accounting invariant holds for this escrow.
    pub fn accounting_invariant_holds(&self) -> bool {
        self.claimed_total
            .checked_add(self.remaining)
            .map(|sum| sum == self.deposited)
            .unwrap_or(false)
    }
}
