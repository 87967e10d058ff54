use atlock_core::account::{Escrow, EscrowStatus};
use atlock_core::error::AtlockError;
use atlock_core::types::{Address, Amount, EscrowId, LedgerTxId, SecretHash, Timestamp};

/// Construct a new escrow (the only transition out of `∅`).
///
/// Rejects `amount == 0` and `timelock <= now`.
pub fn deposit(
    escrow_id: EscrowId,
    initiator: Address,
    redeemer: Address,
    secret_hash: SecretHash,
    amount: Amount,
    timelock: Timestamp,
    partial_fills_allowed: bool,
    ledger_tx_deposit: LedgerTxId,
    now: Timestamp,
) -> Result<Escrow, AtlockError> {
    if amount == 0 {
        return Err(AtlockError::ZeroAmount);
    }
    if timelock <= now {
        return Err(AtlockError::TimelockInPast);
    }

    Ok(Escrow {
        escrow_id,
        initiator,
        redeemer,
        secret_hash,
        deposited: amount,
        remaining: amount,
        claimed_total: 0,
        timelock,
        partial_fills_allowed,
        status: EscrowStatus::Open,
        ledger_tx_deposit,
        ledger_tx_claims: Vec::new(),
        ledger_tx_refund: None,
        revealed_preimage: None,
    })
}
