use std::sync::Arc;

use atlock_coordinator::{new_order, Coordinator, CoordinatorConfig, StartParams};
use atlock_core::transaction::OrderStatus;
use atlock_core::types::{Address, HashAlgorithm, LedgerKind, TokenId};
use atlock_state::{LedgerAdapter, LedgerSimulator, OrderStore};
use atlock_stream::EventBus;

fn tempdir(label: &str) -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "atlock-coordinator-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos()
    ));
    dir
}

fn sample_params() -> StartParams {
    StartParams {
        ledger_a: LedgerKind::Simulated,
        initiator_a: Address("alice-a".into()),
        redeemer_a: Address("bob-a".into()),
        token_a: TokenId("TOK-A".into()),
        amount_a: 1_000_000,
        timelock_a: 3_600_000,

        ledger_b: LedgerKind::Simulated,
        initiator_b: Address("bob-b".into()),
        redeemer_b: Address("alice-b".into()),
        token_b: TokenId("TOK-B".into()),
        amount_b: 10_000,
        timelock_b: 1_800_000,

        hash_algorithm: HashAlgorithm::Sha256,
        partial_fills_allowed: false,
        safety_margin_ms: 300_000,
        expires_at: 7_200_000,
    }
}

struct Harness {
    coordinator: Coordinator,
    adapter_a: Arc<LedgerSimulator>,
    adapter_b: Arc<LedgerSimulator>,
}

fn build_harness(label: &str) -> Harness {
    let store = OrderStore::open(tempdir(label)).unwrap();
    let adapter_a = Arc::new(LedgerSimulator::new(
        Address("alice-a".into()),
        1,
        HashAlgorithm::Sha256,
        0,
    ));
    let adapter_b = Arc::new(LedgerSimulator::new(
        Address("bob-b".into()),
        1,
        HashAlgorithm::Sha256,
        0,
    ));
    let events = Arc::new(EventBus::new(64));
    let coordinator = Coordinator::new(
        store,
        adapter_a.clone() as Arc<dyn LedgerAdapter>,
        adapter_b.clone() as Arc<dyn LedgerAdapter>,
        events,
        CoordinatorConfig::default(),
    );
    Harness {
        coordinator,
        adapter_a,
        adapter_b,
    }
}

/// Scenario 1 — happy path: counterparty claims B, coordinator observes the
/// reveal and claims A in full.
#[tokio::test]
async fn happy_path_completes_both_sides() {
    let harness = build_harness("happy");
    let order = new_order(sample_params(), 0).unwrap();
    let secret = *order.secret.as_ref().unwrap().as_bytes();
    let order_id = harness.coordinator.start(order).await.unwrap();

    let locked = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(locked.status, OrderStatus::BothLocked);
    let escrow_b = locked.side_b.escrow_id.clone().unwrap();

    harness
        .adapter_b
        .claim(&escrow_b, secret, 10_000, Address("alice-b".into()))
        .await
        .unwrap();

    harness.coordinator.drive(order_id.clone()).await.unwrap();

    let completed = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert!(completed.side_a.claim_tx.is_some());
    assert!(completed.side_b.deposit_tx.is_some());
    assert!(completed.side_b.claim_tx.is_some());
    assert_eq!(completed.revealed_preimage().map(|s| *s.as_bytes()), Some(secret));

    let report = atlock_verify::verify_order(
        &order_id,
        harness.coordinator.store(),
        harness.adapter_a.as_ref(),
        harness.adapter_b.as_ref(),
    )
    .await
    .unwrap();
    assert!(report.consistent);
}

/// Scenario 2 — counterparty never claims: coordinator gives up once the
/// counterparty-claim-wait deadline elapses and refunds side A once its own
/// timelock has passed.
#[tokio::test]
async fn counterparty_absent_leads_to_refund() {
    let harness = build_harness("no-counterparty");
    let order = new_order(sample_params(), 0).unwrap();
    let order_id = harness.coordinator.start(order).await.unwrap();

    // Past timelock_b (1_800_000) - safety_margin (300_000): the wait is over.
    harness.adapter_b.advance_clock(1_800_000);
    harness.coordinator.drive(order_id.clone()).await.unwrap();
    let pending = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(pending.status, OrderStatus::RefundPending);

    harness.adapter_a.advance_clock(3_600_001);
    harness.adapter_b.advance_clock(1);
    harness.coordinator.attempt_refund(&order_id).await.unwrap();

    let refunded = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert!(refunded.side_a.refund_tx.is_some());
    assert!(refunded.side_b.refund_tx.is_some());
}

/// Scenario 3 — partial fills: the counterparty claims B in two pieces, but
/// the coordinator only ever needs one claim on A, made as soon as the first
/// partial claim reveals the secret.
#[tokio::test]
async fn partial_claims_on_b_still_complete_a_in_one_claim() {
    let harness = build_harness("partial");
    let mut params = sample_params();
    params.partial_fills_allowed = true;
    let order = new_order(params, 0).unwrap();
    let secret = *order.secret.as_ref().unwrap().as_bytes();
    let order_id = harness.coordinator.start(order).await.unwrap();

    let locked = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    let escrow_b = locked.side_b.escrow_id.clone().unwrap();

    harness
        .adapter_b
        .claim(&escrow_b, secret, 4_000, Address("alice-b".into()))
        .await
        .unwrap();
    harness.coordinator.drive(order_id.clone()).await.unwrap();

    let after_first = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(after_first.status, OrderStatus::Completed);
    assert!(after_first.side_a.claim_tx.is_some());

    harness
        .adapter_b
        .claim(&escrow_b, secret, 6_000, Address("alice-b".into()))
        .await
        .unwrap();
    let snapshot = harness.adapter_b.observe(&escrow_b).await.unwrap();
    assert_eq!(snapshot.remaining, 0);
    assert_eq!(snapshot.claimed_total, 10_000);
}

/// Scenario 4 — wrong secret: a claim attempt with the wrong preimage is
/// rejected on-chain and never reveals anything; the coordinator treats this
/// exactly like an absent counterparty and refunds.
#[tokio::test]
async fn wrong_preimage_is_rejected_on_chain_and_refund_follows() {
    let harness = build_harness("wrong-secret");
    let order = new_order(sample_params(), 0).unwrap();
    let order_id = harness.coordinator.start(order).await.unwrap();
    let locked = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    let escrow_b = locked.side_b.escrow_id.clone().unwrap();

    let wrong_preimage = [0xAAu8; 32];
    let attempt = harness
        .adapter_b
        .claim(&escrow_b, wrong_preimage, 10_000, Address("alice-b".into()))
        .await;
    assert!(attempt.is_err());

    let snapshot = harness.adapter_b.observe(&escrow_b).await.unwrap();
    assert!(snapshot.revealed_preimage.is_none());

    harness.adapter_b.advance_clock(1_800_000);
    harness.coordinator.drive(order_id.clone()).await.unwrap();
    let pending = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(pending.status, OrderStatus::RefundPending);
}

/// Scenario 5 — reorg: a claim event on B is dropped by a reorg before the
/// coordinator observes it; the coordinator must not treat the dropped
/// reveal as real, and falls back to the same timeout/refund path.
#[tokio::test]
async fn reorged_claim_is_not_treated_as_a_real_reveal() {
    let harness = build_harness("reorg");
    let order = new_order(sample_params(), 0).unwrap();
    let secret = *order.secret.as_ref().unwrap().as_bytes();
    let order_id = harness.coordinator.start(order).await.unwrap();
    let locked = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    let escrow_b = locked.side_b.escrow_id.clone().unwrap();

    harness
        .adapter_b
        .claim(&escrow_b, secret, 10_000, Address("alice-b".into()))
        .await
        .unwrap();
    harness.adapter_b.inject_reorg(&escrow_b);

    harness.coordinator.drive(order_id.clone()).await.unwrap();
    let still_waiting = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(still_waiting.status, OrderStatus::BothLocked);

    harness.adapter_b.advance_clock(1_800_000);
    harness.coordinator.drive(order_id.clone()).await.unwrap();
    let pending = harness.coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(pending.status, OrderStatus::RefundPending);
}

/// Scenario 6 — crash recovery: a coordinator restarted against the same
/// store resumes an order left in `BOTH_LOCKED` and drives it to completion
/// once the counterparty's claim shows up.
#[tokio::test]
async fn recovery_resumes_after_restart() {
    let path = tempdir("crash-recovery");
    let adapter_a = Arc::new(LedgerSimulator::new(
        Address("alice-a".into()),
        1,
        HashAlgorithm::Sha256,
        0,
    ));
    let adapter_b = Arc::new(LedgerSimulator::new(
        Address("bob-b".into()),
        1,
        HashAlgorithm::Sha256,
        0,
    ));
    let events = Arc::new(EventBus::new(64));

    let order_id;
    let secret;
    {
        let store = OrderStore::open(&path).unwrap();
        let coordinator = Coordinator::new(
            store,
            adapter_a.clone() as Arc<dyn LedgerAdapter>,
            adapter_b.clone() as Arc<dyn LedgerAdapter>,
            events.clone(),
            CoordinatorConfig::default(),
        );
        let order = new_order(sample_params(), 0).unwrap();
        secret = *order.secret.as_ref().unwrap().as_bytes();
        order_id = coordinator.start(order).await.unwrap();
        // coordinator (and its store handle) drop here, simulating a restart
    }

    let store = OrderStore::open(&path).unwrap();
    let coordinator = Coordinator::new(
        store,
        adapter_a.clone() as Arc<dyn LedgerAdapter>,
        adapter_b.clone() as Arc<dyn LedgerAdapter>,
        events,
        CoordinatorConfig::default(),
    );
    let recovered = atlock_coordinator::recover_non_terminal_orders(&coordinator)
        .await
        .unwrap();
    assert_eq!(recovered, 1);

    let resumed = coordinator.store().get_order(&order_id).unwrap().unwrap();
    let escrow_b = resumed.side_b.escrow_id.clone().unwrap();
    adapter_b
        .claim(&escrow_b, secret, 10_000, Address("alice-b".into()))
        .await
        .unwrap();

    coordinator.drive(order_id.clone()).await.unwrap();
    let completed = coordinator.store().get_order(&order_id).unwrap().unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
}
