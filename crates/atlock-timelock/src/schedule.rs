use atlock_core::types::Timestamp;

/// True once `ledger_now` has passed an escrow's `timelock`, i.e. the escrow
/// is eligible for refund (§4.2's `TooEarly` boundary: refund requires
/// strictly greater than, not equal to, the timelock).
pub fn is_refund_eligible(timelock: Timestamp, ledger_now: Timestamp) -> bool {
    ledger_now > timelock
}

/// Milliseconds remaining until an escrow becomes refund-eligible, or `None`
/// if it already is.
pub fn time_until_refund_eligible(timelock: Timestamp, ledger_now: Timestamp) -> Option<u64> {
    if is_refund_eligible(timelock, ledger_now) {
        None
    } else {
        Some(timelock - ledger_now + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_eligible_before_timelock() {
        assert!(!is_refund_eligible(1_000, 999));
    }

    #[test]
    fn not_eligible_exactly_at_timelock() {
        assert!(!is_refund_eligible(1_000, 1_000));
    }

    #[test]
    fn eligible_one_past_timelock() {
        assert!(is_refund_eligible(1_000, 1_001));
    }

    #[test]
    fn time_remaining_accounts_for_strict_inequality() {
        assert_eq!(time_until_refund_eligible(1_000, 998), Some(3));
        assert_eq!(time_until_refund_eligible(1_000, 1_000), Some(1));
        assert_eq!(time_until_refund_eligible(1_000, 1_001), None);
    }
}
