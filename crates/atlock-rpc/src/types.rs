use serde::{Deserialize, Serialize};

use atlock_core::transaction::{Order, OrderSide, OrderStatus};
use atlock_core::types::{Address, HashAlgorithm, LedgerKind, TokenId};
use atlock_coordinator::StartParams;
use atlock_stream::{Envelope, ProgressEvent};
use atlock_verify::{PhaseCheck, VerifierReport};

fn ledger_kind_to_str(kind: &LedgerKind) -> String {
    match kind {
        LedgerKind::Utxo => "utxo".to_string(),
        LedgerKind::Account => "account".to_string(),
        LedgerKind::Simulated => "simulated".to_string(),
    }
}

fn ledger_kind_from_str(s: &str) -> Result<LedgerKind, String> {
    match s {
        "utxo" => Ok(LedgerKind::Utxo),
        "account" => Ok(LedgerKind::Account),
        "simulated" => Ok(LedgerKind::Simulated),
        other => Err(format!("unknown ledger kind: {other}")),
    }
}

fn hash_algorithm_to_str(algo: &HashAlgorithm) -> String {
    match algo {
        HashAlgorithm::Blake2b256 => "blake2b-256".to_string(),
        HashAlgorithm::Sha256 => "sha-256".to_string(),
    }
}

fn hash_algorithm_from_str(s: &str) -> Result<HashAlgorithm, String> {
    match s {
        "blake2b-256" => Ok(HashAlgorithm::Blake2b256),
        "sha-256" => Ok(HashAlgorithm::Sha256),
        other => Err(format!("unknown hash algorithm: {other}")),
    }
}

fn order_status_to_str(status: &OrderStatus) -> String {
    match status {
        OrderStatus::Created => "created",
        OrderStatus::ALocked => "a_locked",
        OrderStatus::BothLocked => "both_locked",
        OrderStatus::AClaimed => "a_claimed",
        OrderStatus::BClaimed => "b_claimed",
        OrderStatus::Completed => "completed",
        OrderStatus::RefundPending => "refund_pending",
        OrderStatus::Refunded => "refunded",
        OrderStatus::Failed => "failed",
        OrderStatus::Expired => "expired",
    }
    .to_string()
}

/// Caller-supplied parameters for `atlock_start`, the wire form of
/// [`atlock_coordinator::StartParams`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcStartParams {
    pub ledger_a: String,
    pub initiator_a: String,
    pub redeemer_a: String,
    pub token_a: String,
    pub amount_a: u64,
    pub timelock_a: u64,

    pub ledger_b: String,
    pub initiator_b: String,
    pub redeemer_b: String,
    pub token_b: String,
    pub amount_b: u64,
    pub timelock_b: u64,

    pub hash_algorithm: String,
    pub partial_fills_allowed: bool,
    pub safety_margin_ms: u64,
    pub expires_at: u64,
}

impl RpcStartParams {
    pub fn into_start_params(self) -> Result<StartParams, String> {
        Ok(StartParams {
            ledger_a: ledger_kind_from_str(&self.ledger_a)?,
            initiator_a: Address(self.initiator_a),
            redeemer_a: Address(self.redeemer_a),
            token_a: TokenId(self.token_a),
            amount_a: self.amount_a,
            timelock_a: self.timelock_a,

            ledger_b: ledger_kind_from_str(&self.ledger_b)?,
            initiator_b: Address(self.initiator_b),
            redeemer_b: Address(self.redeemer_b),
            token_b: TokenId(self.token_b),
            amount_b: self.amount_b,
            timelock_b: self.timelock_b,

            hash_algorithm: hash_algorithm_from_str(&self.hash_algorithm)?,
            partial_fills_allowed: self.partial_fills_allowed,
            safety_margin_ms: self.safety_margin_ms,
            expires_at: self.expires_at,
        })
    }
}

/// JSON-serializable view of one side of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcOrderSide {
    pub ledger: String,
    pub initiator: String,
    pub redeemer: String,
    pub token: String,
    pub amount: u64,
    pub timelock: u64,
    pub escrow_id: Option<String>,
    pub deposit_tx: Option<String>,
    pub claim_tx: Option<String>,
    pub refund_tx: Option<String>,
}

impl From<&OrderSide> for RpcOrderSide {
    fn from(side: &OrderSide) -> Self {
        Self {
            ledger: ledger_kind_to_str(&side.ledger),
            initiator: side.initiator.to_string(),
            redeemer: side.redeemer.to_string(),
            token: side.token.to_string(),
            amount: side.amount,
            timelock: side.timelock,
            escrow_id: side.escrow_id.as_ref().map(|id| id.to_string()),
            deposit_tx: side.deposit_tx.as_ref().map(|t| t.to_string()),
            claim_tx: side.claim_tx.as_ref().map(|t| t.to_string()),
            refund_tx: side.refund_tx.as_ref().map(|t| t.to_string()),
        }
    }
}

/// JSON-serializable view of an `Order`, returned by `atlock_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcOrder {
    pub order_id: String,
    pub secret_hash: String,
    pub hash_algorithm: String,
    pub side_a: RpcOrderSide,
    pub side_b: RpcOrderSide,
    pub partial_fills_allowed: bool,
    pub created_at: u64,
    pub expires_at: u64,
    pub status: String,
    /// Present only once the preimage has been observed on-chain.
    pub revealed_preimage: Option<String>,
}

impl From<&Order> for RpcOrder {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_hex(),
            secret_hash: order.secret_hash.to_hex(),
            hash_algorithm: hash_algorithm_to_str(&order.hash_algorithm),
            side_a: RpcOrderSide::from(&order.side_a),
            side_b: RpcOrderSide::from(&order.side_b),
            partial_fills_allowed: order.partial_fills_allowed,
            created_at: order.created_at,
            expires_at: order.expires_at,
            status: order_status_to_str(&order.status),
            revealed_preimage: order
                .revealed_preimage()
                .map(|s| hex::encode(s.as_bytes())),
        }
    }
}

/// JSON-serializable view of one [`PhaseCheck`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcPhaseCheck {
    pub side: String,
    pub phase: String,
    pub tx_id: Option<String>,
    pub found: bool,
    pub confirmed: bool,
}

impl From<&PhaseCheck> for RpcPhaseCheck {
    fn from(check: &PhaseCheck) -> Self {
        Self {
            side: check.side.to_string(),
            phase: check.phase.to_string(),
            tx_id: check.tx_id.as_ref().map(|t| t.to_string()),
            found: check.found,
            confirmed: check.confirmed,
        }
    }
}

/// JSON-serializable view of a [`VerifierReport`], returned by `atlock_verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcVerifierReport {
    pub order_id: String,
    pub checks: Vec<RpcPhaseCheck>,
    pub consistent: bool,
}

impl From<&VerifierReport> for RpcVerifierReport {
    fn from(report: &VerifierReport) -> Self {
        Self {
            order_id: report.order_id.to_hex(),
            checks: report.checks.iter().map(RpcPhaseCheck::from).collect(),
            consistent: report.consistent,
        }
    }
}

/// JSON-serializable progress event, the wire form of [`ProgressEvent`].
/// `kind` matches the discriminants named in the external progress-event
/// format; the remaining fields are populated according to `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcProgressEvent {
    pub kind: String,
    pub side: Option<String>,
    pub tx_id: Option<String>,
    pub amount: Option<u64>,
    pub reason: Option<String>,
}

impl From<&ProgressEvent> for RpcProgressEvent {
    fn from(event: &ProgressEvent) -> Self {
        match event {
            ProgressEvent::Created => Self::kind_only("created"),
            ProgressEvent::Deposited { side, tx_id } => Self {
                kind: "deposited".into(),
                side: Some(side.to_string()),
                tx_id: Some(tx_id.to_string()),
                amount: None,
                reason: None,
            },
            ProgressEvent::CounterpartyClaimed { tx_id, amount } => Self {
                kind: "counterparty_claimed".into(),
                side: None,
                tx_id: Some(tx_id.to_string()),
                amount: Some(*amount),
                reason: None,
            },
            ProgressEvent::Claimed { side, tx_id, amount } => Self {
                kind: "claimed".into(),
                side: Some(side.to_string()),
                tx_id: Some(tx_id.to_string()),
                amount: Some(*amount),
                reason: None,
            },
            ProgressEvent::Refunded { side, tx_id, amount } => Self {
                kind: "refunded".into(),
                side: Some(side.to_string()),
                tx_id: Some(tx_id.to_string()),
                amount: Some(*amount),
                reason: None,
            },
            ProgressEvent::Completed => Self::kind_only("completed"),
            ProgressEvent::Failed { reason } => Self {
                kind: "failed".into(),
                side: None,
                tx_id: None,
                amount: None,
                reason: Some(reason.clone()),
            },
            ProgressEvent::Expired => Self::kind_only("expired"),
        }
    }
}

impl RpcProgressEvent {
    fn kind_only(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            side: None,
            tx_id: None,
            amount: None,
            reason: None,
        }
    }
}

/// Wire envelope delivered over `atlock_subscribeProgress`: `{ order_id, seq,
/// ts, kind, payload }` as named in the external progress-event format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub order_id: String,
    pub seq: u64,
    pub ts: u64,
    #[serde(flatten)]
    pub payload: RpcProgressEvent,
}

impl From<&Envelope> for RpcEnvelope {
    fn from(envelope: &Envelope) -> Self {
        Self {
            order_id: envelope.order_id.to_hex(),
            seq: envelope.seq,
            ts: envelope.ts,
            payload: RpcProgressEvent::from(&envelope.event),
        }
    }
}
