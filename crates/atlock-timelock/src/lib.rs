//! Timelock ordering enforcement and refund-eligibility scheduling helpers
//! used by the swap coordinator on top of the escrow state machine.

pub mod ordering;
pub mod schedule;

pub use ordering::{counterparty_claim_wait_remaining, validate_timelock_ordering};
pub use schedule::{is_refund_eligible, time_until_refund_eligible};
