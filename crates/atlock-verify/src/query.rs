use atlock_core::error::AtlockError;
use atlock_core::transaction::{Order, OrderStatus};
use atlock_core::types::{OrderId, Timestamp};
use atlock_state::OrderStore;

/// Read-only query helpers over the Order Record Store, used by the CLI's
/// `status` command and by the Verifier.
pub struct OrderQuery<'a> {
    store: &'a OrderStore,
}

impl<'a> OrderQuery<'a> {
    pub fn new(store: &'a OrderStore) -> Self {
        Self { store }
    }

    pub fn get(&self, order_id: &OrderId) -> Result<Order, AtlockError> {
        self.store
            .get_order(order_id)?
            .ok_or_else(|| AtlockError::OrderNotFound(order_id.to_hex()))
    }

    /// True once an order's own-side refund window has opened, regardless of
    /// whether a refund has actually been attempted yet.
    pub fn is_refund_eligible(&self, order_id: &OrderId, ledger_now_a: Timestamp) -> Result<bool, AtlockError> {
        let order = self.get(order_id)?;
        Ok(!order.status.is_terminal() && ledger_now_a > order.side_a.timelock)
    }

    /// Human-readable one-line summary, mirroring the teacher's status
    /// description helpers.
    pub fn describe(&self, order_id: &OrderId) -> Result<String, AtlockError> {
        let order = self.get(order_id)?;
        let status_str = match &order.status {
            OrderStatus::Created => "created — awaiting side A deposit".to_string(),
            OrderStatus::ALocked => "side A locked — awaiting side B deposit".to_string(),
            OrderStatus::BothLocked => "both sides locked — awaiting counterparty claim".to_string(),
            OrderStatus::AClaimed => "side A claimed by coordinator — finalizing".to_string(),
            OrderStatus::BClaimed => "side B claimed by counterparty — coordinator claiming A".to_string(),
            OrderStatus::Completed => "completed".to_string(),
            OrderStatus::RefundPending => "refund pending".to_string(),
            OrderStatus::Refunded => "refunded".to_string(),
            OrderStatus::Failed => "failed".to_string(),
            OrderStatus::Expired => "expired".to_string(),
        };
        Ok(format!("order {} — {}", order.order_id, status_str))
    }
}
