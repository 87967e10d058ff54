use thiserror::Error;

/// The complete error taxonomy for the swap coordinator.
///
/// Variants are grouped by the categories of the error-handling design:
/// configuration (fatal at startup), transient ledger (retried with
/// backoff), counterparty failure (recovered via refund), state-machine
/// violation (fatal, frozen for audit), and double-spend/reorg.
#[derive(Debug, Error)]
pub enum AtlockError {
    // ── Escrow state machine (§4.2) ─────────────────────────────────────────
    #[error("preimage does not hash to the committed secret_hash")]
    BadSecret,

    #[error("caller is not authorized for this transition")]
    Unauthorized,

    #[error("requested amount is zero or exceeds remaining balance")]
    AmountOutOfRange,

    #[error("partial fills are not allowed for this escrow")]
    PartialNotAllowed,

    #[error("claim rejected: timelock has already elapsed")]
    Expired,

    #[error("refund rejected: timelock has not yet elapsed")]
    TooEarly,

    #[error("refund rejected: nothing remains to refund")]
    NothingToRefund,

    #[error("deposit amount must be greater than zero")]
    ZeroAmount,

    #[error("timelock must be strictly in the future at deposit time")]
    TimelockInPast,

    // ── Timelock ordering (§3.5) ─────────────────────────────────────────────
    #[error(
        "timelock ordering violated: timelock_b ({timelock_b}) + safety_margin \
         ({safety_margin}) must be <= timelock_a ({timelock_a})"
    )]
    TimelockOrderingViolation {
        timelock_a: u64,
        timelock_b: u64,
        safety_margin: u64,
    },

    // ── Configuration (category 1 — fatal at startup) ───────────────────────
    #[error("unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ── Ledger adapter (category 2 — transient, retried) ────────────────────
    #[error("transient ledger error: {0}")]
    TransientLedgerError(String),

    #[error("confirmation wait timed out")]
    ConfirmationTimeout,

    #[error("ledger reported a backward clock jump")]
    ClockWentBackwards,

    // ── Ledger adapter (category 3 — counterparty, recovered via refund) ───
    #[error("counterparty deposit was never observed")]
    CounterpartyDepositAbsent,

    #[error("counterparty claim was never observed before timelock")]
    CounterpartyClaimAbsent,

    // ── Ledger adapter (not retryable without user action) ──────────────────
    #[error("insufficient funds for deposit")]
    InsufficientFunds,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("nonce conflict")]
    NonceConflict,

    #[error("unknown escrow id: {0}")]
    UnknownEscrow(String),

    #[error("contract rejected the call: {code}")]
    ContractReject { code: String },

    #[error("transaction not found after submission horizon")]
    TransactionNotFound,

    // ── Double-spend / reorg (category 5) ────────────────────────────────────
    #[error("observed claim event was invalidated by a reorg")]
    Reorg,

    // ── Order record store ───────────────────────────────────────────────────
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("unsupported record schema_version: {0}")]
    UnsupportedSchemaVersion(u16),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    // ── State-machine violation (category 4 — fatal, frozen for audit) ─────
    #[error("state-machine violation: {0}")]
    StateMachineViolation(String),

    #[error("{0}")]
    Other(String),
}

impl AtlockError {
    /// True for errors the coordinator may retry with backoff (category 2).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AtlockError::TransientLedgerError(_)
                | AtlockError::ConfirmationTimeout
                | AtlockError::ClockWentBackwards
        )
    }

    /// True for errors that are fatal and must never be silently retried
    /// (category 4 and unresolved category 5).
    pub fn is_fatal_violation(&self) -> bool {
        matches!(
            self,
            AtlockError::StateMachineViolation(_) | AtlockError::BadSecret
        )
    }
}
