use atlock_core::account::{Escrow, EscrowStatus};
use atlock_core::error::AtlockError;
use atlock_core::types::{Address, Amount, HashAlgorithm, LedgerTxId, Timestamp};
use atlock_crypto::verify as verify_preimage;

/// Apply a claim transition in place.
///
/// Checks (in order, matching the escrow state machine contract):
/// 1. `H(preimage) == secret_hash`
/// 2. `caller == redeemer`
/// 3. `0 < requested_amount <= remaining`
/// 4. `partial_fills_allowed` or `requested_amount == remaining`
/// 5. `ledger_now <= timelock` (claims blocked once the refund window opens)
///
/// On success: `remaining -= requested_amount`, `claimed_total += requested_amount`;
/// sets `FullyClaimed` if `remaining` reaches zero.
pub fn claim(
    escrow: &mut Escrow,
    preimage: &[u8; 32],
    requested_amount: Amount,
    caller: &Address,
    ledger_now: Timestamp,
    hash_algorithm: HashAlgorithm,
    tx_id: LedgerTxId,
) -> Result<(), AtlockError> {
    if !verify_preimage(preimage, &escrow.secret_hash, hash_algorithm) {
        return Err(AtlockError::BadSecret);
    }
    if *caller != escrow.redeemer {
        return Err(AtlockError::Unauthorized);
    }
    if requested_amount == 0 || requested_amount > escrow.remaining {
        return Err(AtlockError::AmountOutOfRange);
    }
    if !escrow.partial_fills_allowed && requested_amount < escrow.remaining {
        return Err(AtlockError::PartialNotAllowed);
    }
    if ledger_now > escrow.timelock {
        return Err(AtlockError::Expired);
    }

    escrow.remaining -= requested_amount;
    escrow.claimed_total += requested_amount;
    escrow.ledger_tx_claims.push(tx_id);
    escrow.revealed_preimage = Some(*preimage);
    if escrow.remaining == 0 {
        escrow.status = EscrowStatus::FullyClaimed;
    }

    debug_assert!(escrow.accounting_invariant_holds());
    Ok(())
}

/// Apply a refund transition in place.
///
/// Checks: `ledger_now > timelock`, `caller == initiator`, `remaining > 0`.
/// On success: `remaining` returns to the initiator, status becomes `Refunded`.
pub fn refund(
    escrow: &mut Escrow,
    caller: &Address,
    ledger_now: Timestamp,
    tx_id: LedgerTxId,
) -> Result<Amount, AtlockError> {
    if ledger_now <= escrow.timelock {
        return Err(AtlockError::TooEarly);
    }
    if *caller != escrow.initiator {
        return Err(AtlockError::Unauthorized);
    }
    if escrow.remaining == 0 {
        return Err(AtlockError::NothingToRefund);
    }

    let refunded = escrow.remaining;
    escrow.remaining = 0;
    escrow.status = EscrowStatus::Refunded;
    escrow.ledger_tx_refund = Some(tx_id);

    debug_assert!(escrow.accounting_invariant_holds());
    Ok(refunded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::deposit;
    use atlock_core::types::EscrowId;
    use atlock_crypto::{hash_of, generate};

    fn addr(s: &str) -> Address {
        Address(s.to_string())
    }

    fn make_escrow(partial_fills_allowed: bool, timelock: Timestamp) -> (Escrow, [u8; 32]) {
        let secret = generate();
        let hash = hash_of(&secret, HashAlgorithm::Sha256);
        let escrow = deposit(
            EscrowId("e1".into()),
            addr("initiator"),
            addr("redeemer"),
            hash,
            1_000,
            timelock,
            partial_fills_allowed,
            LedgerTxId("deposit-tx".into()),
            0,
        )
        .unwrap();
        (escrow, *secret.as_bytes())
    }

    #[test]
    fn full_claim_without_partial_fills_succeeds() {
        let (mut escrow, preimage) = make_escrow(false, 1_000);
        let result = claim(
            &mut escrow,
            &preimage,
            1_000,
            &addr("redeemer"),
            500,
            HashAlgorithm::Sha256,
            LedgerTxId("claim-tx".into()),
        );
        assert!(result.is_ok());
        assert_eq!(escrow.status, EscrowStatus::FullyClaimed);
        assert_eq!(escrow.remaining, 0);
        assert_eq!(escrow.claimed_total, 1_000);
    }

    #[test]
    fn partial_claim_without_partial_fills_fails() {
        let (mut escrow, preimage) = make_escrow(false, 1_000);
        let result = claim(
            &mut escrow,
            &preimage,
            400,
            &addr("redeemer"),
            500,
            HashAlgorithm::Sha256,
            LedgerTxId("claim-tx".into()),
        );
        assert!(matches!(result, Err(AtlockError::PartialNotAllowed)));
    }

    #[test]
    fn multiple_partial_claims_sum_to_deposited() {
        let (mut escrow, preimage) = make_escrow(true, 1_000);
        claim(
            &mut escrow,
            &preimage,
            400,
            &addr("redeemer"),
            100,
            HashAlgorithm::Sha256,
            LedgerTxId("claim-1".into()),
        )
        .unwrap();
        claim(
            &mut escrow,
            &preimage,
            600,
            &addr("redeemer"),
            200,
            HashAlgorithm::Sha256,
            LedgerTxId("claim-2".into()),
        )
        .unwrap();
        assert_eq!(escrow.status, EscrowStatus::FullyClaimed);
        assert_eq!(escrow.claimed_total, 1_000);
        assert_eq!(escrow.remaining, 0);

        let overflow = claim(
            &mut escrow,
            &preimage,
            1,
            &addr("redeemer"),
            300,
            HashAlgorithm::Sha256,
            LedgerTxId("claim-3".into()),
        );
        assert!(matches!(overflow, Err(AtlockError::AmountOutOfRange)));
    }

    #[test]
    fn claim_with_wrong_preimage_fails_bad_secret() {
        let (mut escrow, _preimage) = make_escrow(false, 1_000);
        let wrong = [0xFFu8; 32];
        let result = claim(
            &mut escrow,
            &wrong,
            1_000,
            &addr("redeemer"),
            500,
            HashAlgorithm::Sha256,
            LedgerTxId("claim-tx".into()),
        );
        assert!(matches!(result, Err(AtlockError::BadSecret)));
    }

    #[test]
    fn refund_exactly_at_timelock_fails_too_early() {
        let (mut escrow, _preimage) = make_escrow(false, 1_000);
        let result = refund(&mut escrow, &addr("initiator"), 1_000, LedgerTxId("r".into()));
        assert!(matches!(result, Err(AtlockError::TooEarly)));
    }

    #[test]
    fn refund_one_past_timelock_succeeds() {
        let (mut escrow, _preimage) = make_escrow(false, 1_000);
        let result = refund(&mut escrow, &addr("initiator"), 1_001, LedgerTxId("r".into()));
        assert!(result.is_ok());
        assert_eq!(escrow.status, EscrowStatus::Refunded);
        assert_eq!(escrow.remaining, 0);
    }

    #[test]
    fn claim_after_timelock_expired_fails() {
        let (mut escrow, preimage) = make_escrow(false, 1_000);
        let result = claim(
            &mut escrow,
            &preimage,
            1_000,
            &addr("redeemer"),
            1_001,
            HashAlgorithm::Sha256,
            LedgerTxId("claim-tx".into()),
        );
        assert!(matches!(result, Err(AtlockError::Expired)));
    }
}
