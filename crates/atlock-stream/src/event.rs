use atlock_core::types::{Amount, LedgerSide, LedgerTxId, OrderId, Timestamp};
use serde::{Deserialize, Serialize};

/// The `kind` discriminant of a progress event, as delivered over the
/// subscription envelope (§6: `{ order_id, seq, ts, kind, payload }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressEvent {
    Created,
    Deposited { side: LedgerSide, tx_id: LedgerTxId },
    CounterpartyClaimed { tx_id: LedgerTxId, amount: Amount },
    Claimed { side: LedgerSide, tx_id: LedgerTxId, amount: Amount },
    Refunded { side: LedgerSide, tx_id: LedgerTxId, amount: Amount },
    Completed,
    Failed { reason: String },
    Expired,
}

/// One envelope on the wire: `{ order_id, seq, ts, kind, payload }`.
/// `seq` is per-order and monotonically increasing; consumers deduplicate
/// at-least-once delivery by `(order_id, seq)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub order_id: OrderId,
    pub seq: u64,
    pub ts: Timestamp,
    pub event: ProgressEvent,
}

impl Envelope {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Envelope serialization is infallible")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// Deduplication key for at-least-once delivery.
    pub fn dedup_key(&self) -> (OrderId, u64) {
        (self.order_id.clone(), self.seq)
    }
}
