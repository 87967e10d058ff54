use atlock_core::error::AtlockError;
use atlock_core::transaction::{Order, OrderSide, OrderStatus};
use atlock_core::types::{Address, Amount, HashAlgorithm, LedgerKind, OrderId, Timestamp, TokenId};
use atlock_crypto::{generate, hash_of};
use atlock_timelock::validate_timelock_ordering;
use rand::RngCore;

/// Caller-supplied parameters for `swap_start` (§6).
pub struct StartParams {
    pub ledger_a: LedgerKind,
    pub initiator_a: Address,
    pub redeemer_a: Address,
    pub token_a: TokenId,
    pub amount_a: Amount,
    pub timelock_a: Timestamp,

    pub ledger_b: LedgerKind,
    pub initiator_b: Address,
    pub redeemer_b: Address,
    pub token_b: TokenId,
    pub amount_b: Amount,
    pub timelock_b: Timestamp,

    pub hash_algorithm: HashAlgorithm,
    pub partial_fills_allowed: bool,
    pub safety_margin_ms: u64,
    pub expires_at: Timestamp,
}

/// Construct a new `Order` from `params`, generating a fresh secret and
/// validating the cross-escrow timelock ordering invariant (§3.5) before any
/// deposit is attempted.
pub fn new_order(params: StartParams, created_at: Timestamp) -> Result<Order, AtlockError> {
    validate_timelock_ordering(params.timelock_a, params.timelock_b, params.safety_margin_ms)?;

    let secret = generate();
    let secret_hash = hash_of(&secret, params.hash_algorithm);

    let side_a = OrderSide::new(
        params.ledger_a,
        params.initiator_a,
        params.redeemer_a,
        params.token_a,
        params.amount_a,
        params.timelock_a,
    );
    let side_b = OrderSide::new(
        params.ledger_b,
        params.initiator_b,
        params.redeemer_b,
        params.token_b,
        params.amount_b,
        params.timelock_b,
    );

    Ok(Order {
        schema_version: atlock_core::constants::CURRENT_SCHEMA_VERSION,
        order_id: random_order_id(),
        secret: Some(secret),
        secret_hash,
        hash_algorithm: params.hash_algorithm,
        side_a,
        side_b,
        partial_fills_allowed: params.partial_fills_allowed,
        created_at,
        expires_at: params.expires_at,
        status: OrderStatus::Created,
    })
}

fn random_order_id() -> OrderId {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    OrderId(bytes)
}

/// Receipt returned once an order reaches a terminal status (§4.8).
pub struct Receipt {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub deposit_a_tx: Option<String>,
    pub deposit_b_tx: Option<String>,
    pub claim_a_tx: Option<String>,
    pub claim_b_tx: Option<String>,
    pub refund_a_tx: Option<String>,
    pub refund_b_tx: Option<String>,
    pub revealed_preimage: Option<[u8; 32]>,
}

impl Receipt {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            status: order.status.clone(),
            deposit_a_tx: order.side_a.deposit_tx.as_ref().map(|t| t.to_string()),
            deposit_b_tx: order.side_b.deposit_tx.as_ref().map(|t| t.to_string()),
            claim_a_tx: order.side_a.claim_tx.as_ref().map(|t| t.to_string()),
            claim_b_tx: order.side_b.claim_tx.as_ref().map(|t| t.to_string()),
            refund_a_tx: order.side_a.refund_tx.as_ref().map(|t| t.to_string()),
            refund_b_tx: order.side_b.refund_tx.as_ref().map(|t| t.to_string()),
            revealed_preimage: order.revealed_preimage().map(|s| *s.as_bytes()),
        }
    }
}
