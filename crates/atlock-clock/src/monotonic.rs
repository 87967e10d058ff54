use std::collections::HashMap;

use atlock_core::error::AtlockError;
use atlock_core::types::{LedgerSide, Timestamp};

/// Tracks the last `now()` observed from each ledger's own clock facility and
/// rejects backward jumps.
///
/// The coordinator never reasons about a ledger's timelock using local
/// wall-clock time; it always goes through this tracker so that a
/// misbehaving or reorging node surfaces as a `ClockWentBackwards` error
/// instead of silently producing an inconsistent timelock decision.
#[derive(Debug, Clone, Default)]
pub struct MonotonicClock {
    last_seen: HashMap<LedgerSide, Timestamp>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `observed` as the latest `now()` read from `side`'s ledger.
    ///
    /// Returns the accepted timestamp, or `ClockWentBackwards` if `observed`
    /// is strictly less than the last value seen for this side.
    pub fn observe(&mut self, side: LedgerSide, observed: Timestamp) -> Result<Timestamp, AtlockError> {
        match self.last_seen.get(&side) {
            Some(&last) if observed < last => Err(AtlockError::ClockWentBackwards),
            _ => {
                self.last_seen.insert(side, observed);
                Ok(observed)
            }
        }
    }

    /// Last timestamp accepted for `side`, if any has been observed yet.
    pub fn last(&self, side: LedgerSide) -> Option<Timestamp> {
        self.last_seen.get(&side).copied()
    }
}
