use std::collections::HashMap;

use atlock_core::types::LedgerTxId;
use tracing::{debug, info};

/// Emitted when a transaction's confirmation count changes.
#[derive(Debug, Clone)]
pub struct ConfirmationEvent {
    pub tx_id: LedgerTxId,
    pub confirmation_count: u32,
    pub confirmed: bool,
}

/// Tracks confirmations observed for in-flight transactions and reports once
/// each crosses its ledger's required threshold.
///
/// A transaction that is reported as confirmed and later disappears from
/// observation (a reorg) is dropped from tracking; the caller is expected to
/// treat its absence on the next `observe` as a reorg per the error taxonomy.
pub struct ConfirmationTracker {
    confirmations_required: u32,
    seen: HashMap<LedgerTxId, u32>,
}

impl ConfirmationTracker {
    pub fn new(confirmations_required: u32) -> Self {
        Self {
            confirmations_required,
            seen: HashMap::new(),
        }
    }

    /// Record that `tx_id` now has `count` confirmations as observed from the
    /// ledger. Returns an event once per call; `confirmed` is set once
    /// `count >= confirmations_required`.
    pub fn record(&mut self, tx_id: LedgerTxId, count: u32) -> ConfirmationEvent {
        self.seen.insert(tx_id.clone(), count);
        let confirmed = count >= self.confirmations_required;
        if confirmed {
            info!(tx_id = %tx_id, confirmations = count, "transaction reached confirmation threshold");
        } else {
            debug!(tx_id = %tx_id, confirmations = count, required = self.confirmations_required, "awaiting confirmations");
        }
        ConfirmationEvent {
            tx_id,
            confirmation_count: count,
            confirmed,
        }
    }

    /// Stop tracking `tx_id`, e.g. once its order has reached a terminal
    /// state and no further reorg can affect a coordinator decision.
    pub fn forget(&mut self, tx_id: &LedgerTxId) {
        self.seen.remove(tx_id);
    }

    pub fn confirmations_of(&self, tx_id: &LedgerTxId) -> u32 {
        self.seen.get(tx_id).copied().unwrap_or(0)
    }

    pub fn pending_count(&self) -> usize {
        self.seen
            .values()
            .filter(|&&c| c < self.confirmations_required)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_not_confirmed() {
        let mut tracker = ConfirmationTracker::new(3);
        let tx = LedgerTxId("tx-1".into());
        let event = tracker.record(tx, 1);
        assert!(!event.confirmed);
    }

    #[test]
    fn threshold_reached_marks_confirmed() {
        let mut tracker = ConfirmationTracker::new(2);
        let tx = LedgerTxId("tx-2".into());
        tracker.record(tx.clone(), 1);
        let event = tracker.record(tx, 2);
        assert!(event.confirmed);
    }

    #[test]
    fn forget_removes_tracking() {
        let mut tracker = ConfirmationTracker::new(1);
        let tx = LedgerTxId("tx-3".into());
        tracker.record(tx.clone(), 1);
        assert_eq!(tracker.pending_count(), 0);
        tracker.forget(&tx);
        assert_eq!(tracker.confirmations_of(&tx), 0);
    }
}
