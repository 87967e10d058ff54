use atlock_core::error::AtlockError;
use atlock_core::types::Timestamp;

/// Validate the cross-escrow timelock ordering invariant: the side whose
/// initiator learns the secret first (side B, claimed first) must have
/// strictly less time to act than the side that could otherwise refund
/// prematurely (side A).
///
/// `safety_margin` bounds worst-case ledger finality plus coordinator
/// restart time; it is never zero in a validated configuration.
pub fn validate_timelock_ordering(
    timelock_a: Timestamp,
    timelock_b: Timestamp,
    safety_margin: u64,
) -> Result<(), AtlockError> {
    let required = timelock_b.checked_add(safety_margin).ok_or_else(|| {
        AtlockError::TimelockOrderingViolation {
            timelock_a,
            timelock_b,
            safety_margin,
        }
    })?;
    if required > timelock_a {
        return Err(AtlockError::TimelockOrderingViolation {
            timelock_a,
            timelock_b,
            safety_margin,
        });
    }
    Ok(())
}

/// Deadline by which the coordinator must see the counterparty's claim on
/// side B before giving up and moving to refund on side A.
///
/// `timelock_b - ledger_now(b) - safety_margin`, saturating at zero.
pub fn counterparty_claim_wait_remaining(
    timelock_b: Timestamp,
    ledger_now_b: Timestamp,
    safety_margin: u64,
) -> u64 {
    timelock_b
        .saturating_sub(ledger_now_b)
        .saturating_sub(safety_margin)
}
