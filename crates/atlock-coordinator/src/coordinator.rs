use std::sync::Arc;

use atlock_core::error::AtlockError;
use atlock_core::transaction::{Order, OrderStatus};
use atlock_core::types::{LedgerSide, LedgerTxId, OrderId};
use atlock_crypto::verify as verify_preimage;
use atlock_state::{DepositParams, LedgerAdapter, OrderStore};
use atlock_stream::{EventBus, ProgressEvent};
use atlock_timelock::counterparty_claim_wait_remaining;
use tracing::{error, info, warn};

use crate::config::CoordinatorConfig;
use crate::nonce::step_nonce;

/// Drives the two-phase lock/claim protocol (§4.7) for every order handed to
/// it. A single-threaded cooperative scheduler per order: each call below
/// checkpoints the store before and after the one ledger call it makes, and
/// never carries in-memory state across an `.await` without persisting it
/// first, so a crash between any two calls leaves the record in a state
/// crash recovery (§4.7) can resume from directly.
pub struct Coordinator {
    store: OrderStore,
    adapter_a: Arc<dyn LedgerAdapter>,
    adapter_b: Arc<dyn LedgerAdapter>,
    events: Arc<EventBus>,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        store: OrderStore,
        adapter_a: Arc<dyn LedgerAdapter>,
        adapter_b: Arc<dyn LedgerAdapter>,
        events: Arc<EventBus>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            store,
            adapter_a,
            adapter_b,
            events,
            config,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Phase 1: persist a freshly-constructed order, then drive it forward.
    /// Returns once the order reaches a terminal status or a non-retryable
    /// error.
    pub async fn start(&self, order: Order) -> Result<OrderId, AtlockError> {
        let order_id = order.order_id.clone();
        self.store.put_order(&order)?;
        self.publish(&order_id, order.created_at, ProgressEvent::Created);
        info!(order_id = %order_id, "order created");

        self.drive(order_id.clone()).await?;
        Ok(order_id)
    }

    fn load(&self, order_id: &OrderId) -> Result<Order, AtlockError> {
        self.store
            .get_order(order_id)?
            .ok_or_else(|| AtlockError::OrderNotFound(order_id.to_hex()))
    }

    /// Resume an in-flight order from whatever status it is currently
    /// persisted under. Used both by `start` and by crash recovery.
    ///
    /// Each step is single-shot: a step that cannot make progress yet (still
    /// waiting on the counterparty's claim, or on a confirmation) returns
    /// without changing the order's status, and `drive` stops rather than
    /// spin. The node re-invokes `drive` on a timer to retry those orders,
    /// which also doubles as the crash-recovery scan (§4.7).
    pub async fn drive(&self, order_id: OrderId) -> Result<(), AtlockError> {
        loop {
            let before = self.load(&order_id)?.status;
            match before {
                OrderStatus::Created => self.lock_side_a(&order_id).await?,
                OrderStatus::ALocked => self.lock_side_b(&order_id).await?,
                OrderStatus::BothLocked => self.await_counterparty_claim(&order_id).await?,
                OrderStatus::BClaimed => self.claim_side_a(&order_id).await?,
                OrderStatus::AClaimed => self.await_claim_confirmation(&order_id).await?,
                OrderStatus::RefundPending => self.attempt_refund(&order_id).await?,
                OrderStatus::Completed
                | OrderStatus::Refunded
                | OrderStatus::Failed
                | OrderStatus::Expired => return Ok(()),
            }
            if self.load(&order_id)?.status == before {
                return Ok(());
            }
        }
    }

    async fn lock_side_a(&self, order_id: &OrderId) -> Result<(), AtlockError> {
        let mut order = self.load(order_id)?;
        let nonce = step_nonce(order_id, "deposit_a");

        let result = self
            .adapter_a
            .deposit(DepositParams {
                initiator: order.side_a.initiator.clone(),
                redeemer: order.side_a.redeemer.clone(),
                secret_hash: order.secret_hash.clone(),
                amount: order.side_a.amount,
                timelock: order.side_a.timelock,
                partial_fills_allowed: order.partial_fills_allowed,
                nonce,
            })
            .await?;

        order.side_a.escrow_id = Some(result.escrow_id);
        order.side_a.deposit_tx = Some(result.tx_id.clone());
        order.status = OrderStatus::ALocked;
        self.store.put_order(&order)?;
        self.publish(
            order_id,
            result.included_at,
            ProgressEvent::Deposited {
                side: LedgerSide::A,
                tx_id: result.tx_id,
            },
        );
        info!(order_id = %order_id, "side A locked");
        Ok(())
    }

    async fn lock_side_b(&self, order_id: &OrderId) -> Result<(), AtlockError> {
        let mut order = self.load(order_id)?;
        let nonce = step_nonce(order_id, "deposit_b");

        let result = self
            .adapter_b
            .deposit(DepositParams {
                initiator: order.side_b.initiator.clone(),
                redeemer: order.side_b.redeemer.clone(),
                secret_hash: order.secret_hash.clone(),
                amount: order.side_b.amount,
                timelock: order.side_b.timelock,
                partial_fills_allowed: order.partial_fills_allowed,
                nonce,
            })
            .await?;

        order.side_b.escrow_id = Some(result.escrow_id);
        order.side_b.deposit_tx = Some(result.tx_id.clone());
        order.status = OrderStatus::BothLocked;
        self.store.put_order(&order)?;
        self.publish(
            order_id,
            result.included_at,
            ProgressEvent::Deposited {
                side: LedgerSide::B,
                tx_id: result.tx_id,
            },
        );
        info!(order_id = %order_id, "side B locked — both sides locked");
        Ok(())
    }

    /// One check of ledger B for the counterparty's claim. If the
    /// counterparty-claim-wait deadline (§5) has passed with no claim
    /// observed, moves the order to `REFUND_PENDING`; otherwise leaves the
    /// status unchanged so the next scheduled `drive` call checks again.
    async fn await_counterparty_claim(&self, order_id: &OrderId) -> Result<(), AtlockError> {
        let order = self.load(order_id)?;
        let escrow_id = order.side_b.escrow_id.clone().ok_or_else(|| {
            AtlockError::StateMachineViolation("both_locked order missing side B escrow_id".into())
        })?;

        let ledger_now_b = self.adapter_b.now().await?;
        let snapshot = self.adapter_b.observe(&escrow_id).await?;

        if let Some(revealed) = snapshot.revealed_preimage {
            let claim_tx = snapshot.claim_tx.ok_or_else(|| {
                AtlockError::StateMachineViolation(
                    "side B observe() revealed a preimage with no claim tx id".into(),
                )
            })?;
            return self
                .handle_counterparty_claim(order_id, revealed, claim_tx)
                .await;
        }

        let remaining = counterparty_claim_wait_remaining(
            order.side_b.timelock,
            ledger_now_b,
            self.config.safety_margin_ms,
        );
        if remaining == 0 {
            warn!(order_id = %order_id, "counterparty claim wait expired — moving to refund");
            let mut order = order;
            order.status = OrderStatus::RefundPending;
            self.store.put_order(&order)?;
        }
        Ok(())
    }

    async fn handle_counterparty_claim(
        &self,
        order_id: &OrderId,
        revealed: [u8; 32],
        claim_tx: LedgerTxId,
    ) -> Result<(), AtlockError> {
        let mut order = self.load(order_id)?;

        if !verify_preimage(&revealed, &order.secret_hash, order.hash_algorithm) {
            error!(order_id = %order_id, "claim on side B revealed a preimage that does not match secret_hash");
            order.status = OrderStatus::Failed;
            self.store.put_order(&order)?;
            self.publish(
                order_id,
                0,
                ProgressEvent::Failed {
                    reason: "revealed preimage does not match secret_hash".into(),
                },
            );
            return Err(AtlockError::StateMachineViolation(
                "counterparty claim revealed a preimage inconsistent with secret_hash".into(),
            ));
        }

        order.secret = Some(atlock_core::types::Secret(revealed));
        order.side_b.claim_tx = Some(claim_tx.clone());
        order.status = OrderStatus::BClaimed;
        self.store.put_order(&order)?;
        self.publish(
            order_id,
            0,
            ProgressEvent::CounterpartyClaimed {
                tx_id: claim_tx,
                amount: order.side_b.amount,
            },
        );
        info!(order_id = %order_id, "counterparty claimed side B, preimage recovered");
        Ok(())
    }

    async fn claim_side_a(&self, order_id: &OrderId) -> Result<(), AtlockError> {
        let mut order = self.load(order_id)?;
        let escrow_id = order.side_a.escrow_id.clone().ok_or_else(|| {
            AtlockError::StateMachineViolation("b_claimed order missing side A escrow_id".into())
        })?;
        let preimage = *order
            .secret
            .as_ref()
            .ok_or_else(|| {
                AtlockError::StateMachineViolation("b_claimed order missing revealed secret".into())
            })?
            .as_bytes();

        let result = self
            .adapter_a
            .claim(&escrow_id, preimage, order.side_a.amount, order.side_a.redeemer.clone())
            .await?;

        order.side_a.claim_tx = Some(result.tx_id.clone());
        order.status = OrderStatus::AClaimed;
        self.store.put_order(&order)?;
        self.publish(
            order_id,
            result.included_at,
            ProgressEvent::Claimed {
                side: LedgerSide::A,
                tx_id: result.tx_id,
                amount: order.side_a.amount,
            },
        );
        info!(order_id = %order_id, "side A claimed — awaiting confirmation");
        Ok(())
    }

    /// `A_CLAIMED` is not yet terminal: one check of whether the claim tx
    /// has crossed the confirmation threshold before declaring the order
    /// `COMPLETED` (§4.7's crash-recovery note that a claim may have already
    /// succeeded while only the record is stale). A reorg that drops the
    /// claim surfaces as a state-machine violation rather than silently
    /// retrying the claim. Leaves the status unchanged if not yet confirmed;
    /// the next scheduled `drive` call checks again.
    async fn await_claim_confirmation(&self, order_id: &OrderId) -> Result<(), AtlockError> {
        let mut order = self.load(order_id)?;
        let tx_id = order.side_a.claim_tx.clone().ok_or_else(|| {
            AtlockError::StateMachineViolation("a_claimed order missing side A claim tx".into())
        })?;

        let verification = self.adapter_a.verify_tx(&tx_id).await?;
        if !verification.found {
            error!(order_id = %order_id, "side A claim tx no longer found — treating as reorg");
            return Err(AtlockError::Reorg);
        }
        if verification.confirmed {
            order.status = OrderStatus::Completed;
            self.store.put_order(&order)?;
            self.publish(order_id, 0, ProgressEvent::Completed);
            info!(order_id = %order_id, "side A claim confirmed — order completed");
        }
        Ok(())
    }

    /// Refund whichever sides are past their own timelock and still have
    /// funds locked. Attempted independently per side (§4.7); an order is
    /// marked `REFUNDED` once at least one side has actually been refunded.
    pub async fn attempt_refund(&self, order_id: &OrderId) -> Result<(), AtlockError> {
        let mut order = self.load(order_id)?;
        let mut refunded_any = false;

        if order.side_a.refund_tx.is_none() {
            if let Some(tx_id) = self.try_refund_side(order_id, LedgerSide::A, &order).await? {
                order.side_a.refund_tx = Some(tx_id);
                refunded_any = true;
            }
        }
        if order.side_b.refund_tx.is_none() {
            if let Some(tx_id) = self.try_refund_side(order_id, LedgerSide::B, &order).await? {
                order.side_b.refund_tx = Some(tx_id);
                refunded_any = true;
            }
        }

        if refunded_any {
            order.status = OrderStatus::Refunded;
            info!(order_id = %order_id, "refund completed");
        }
        self.store.put_order(&order)?;
        Ok(())
    }

    async fn try_refund_side(
        &self,
        order_id: &OrderId,
        side: LedgerSide,
        order: &Order,
    ) -> Result<Option<atlock_core::types::LedgerTxId>, AtlockError> {
        let (adapter, order_side): (&Arc<dyn LedgerAdapter>, _) = match side {
            LedgerSide::A => (&self.adapter_a, &order.side_a),
            LedgerSide::B => (&self.adapter_b, &order.side_b),
        };
        let escrow_id = match &order_side.escrow_id {
            Some(id) => id.clone(),
            None => return Ok(None),
        };

        let ledger_now = adapter.now().await?;
        if ledger_now <= order_side.timelock {
            return Ok(None);
        }

        match adapter.refund(&escrow_id, order_side.initiator.clone()).await {
            Ok(result) => {
                self.publish(
                    order_id,
                    result.included_at,
                    ProgressEvent::Refunded {
                        side,
                        tx_id: result.tx_id.clone(),
                        amount: order_side.amount,
                    },
                );
                Ok(Some(result.tx_id))
            }
            Err(AtlockError::NothingToRefund) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn publish(&self, order_id: &OrderId, ts: u64, event: ProgressEvent) {
        self.events.publish(order_id.clone(), ts, event);
    }
}
