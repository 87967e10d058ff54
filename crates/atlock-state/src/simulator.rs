//! The Ledger Adapter interface (C5) and a deterministic in-memory
//! simulator implementing it. A real adapter against an external L1/L2 is
//! out of scope; only this simulator ships in the repository, used by the
//! coordinator's own tests and by development nodes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use atlock_core::account::{Escrow, EscrowStatus};
use atlock_core::error::AtlockError;
use atlock_core::types::{Address, Amount, EscrowId, HashAlgorithm, LedgerTxId, Timestamp};
use atlock_escrow::{claim as apply_claim, deposit as apply_deposit, refund as apply_refund};

// ── Adapter contract ─────────────────────────────────────────────────────────

/// Parameters for a deposit write.
pub struct DepositParams {
    pub initiator: Address,
    pub redeemer: Address,
    pub secret_hash: atlock_core::types::SecretHash,
    pub amount: Amount,
    pub timelock: Timestamp,
    pub partial_fills_allowed: bool,
    /// Coordinator-generated nonce; adapters deduplicate by this where the
    /// ledger supports it.
    pub nonce: String,
}

pub struct DepositResult {
    pub escrow_id: EscrowId,
    pub tx_id: LedgerTxId,
    pub included_at: Timestamp,
}

pub struct ClaimResult {
    pub tx_id: LedgerTxId,
    pub included_at: Timestamp,
    /// Parsed from the transaction's emitted event, never taken on trust
    /// from the submitter.
    pub revealed_preimage: [u8; 32],
}

pub struct RefundResult {
    pub tx_id: LedgerTxId,
    pub included_at: Timestamp,
}

/// Current observed state of one escrow, as read back from the ledger.
#[derive(Clone)]
pub struct EscrowSnapshot {
    pub remaining: Amount,
    pub claimed_total: Amount,
    pub status: EscrowStatus,
    /// Preimage revealed by the most recent claim's on-chain event, if any
    /// claim has landed and survived (a reorg clears this back to `None`).
    pub revealed_preimage: Option<[u8; 32]>,
    /// Transaction id of the most recent successful claim, if any has landed
    /// and survived (a reorg clears this back to `None`).
    pub claim_tx: Option<LedgerTxId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Ok,
    Reverted,
}

pub struct TxVerification {
    pub found: bool,
    pub confirmed: bool,
    pub block_number: Option<u64>,
    pub status: Option<TxStatus>,
}

/// Uniform write/read operations over one concrete ledger (§4.5, §6).
/// Adapters are stateless across calls except for a connection to their
/// ledger; all durable state lives in the Order Record Store.
#[async_trait]
pub trait LedgerAdapter: Send + Sync {
    async fn deposit(&self, params: DepositParams) -> Result<DepositResult, AtlockError>;

    async fn claim(
        &self,
        escrow_id: &EscrowId,
        preimage: [u8; 32],
        amount: Amount,
        caller: Address,
    ) -> Result<ClaimResult, AtlockError>;

    async fn refund(
        &self,
        escrow_id: &EscrowId,
        caller: Address,
    ) -> Result<RefundResult, AtlockError>;

    async fn observe(&self, escrow_id: &EscrowId) -> Result<EscrowSnapshot, AtlockError>;

    async fn now(&self) -> Result<Timestamp, AtlockError>;

    fn explorer_url(&self, tx_id: &LedgerTxId) -> String;

    fn address(&self) -> Address;

    async fn balance(&self) -> Result<Amount, AtlockError>;

    async fn verify_tx(&self, tx_id: &LedgerTxId) -> Result<TxVerification, AtlockError>;
}

// ── Simulator ────────────────────────────────────────────────────────────────

struct SimulatorState {
    escrows: HashMap<EscrowId, Escrow>,
    /// nonce -> escrow_id, for deposit idempotence.
    seen_deposit_nonces: HashMap<String, EscrowId>,
    clock_ms: Timestamp,
    next_escrow_seq: u64,
    /// Confirmation count observed so far, per escrow's most recent claim tx.
    confirmations: HashMap<LedgerTxId, u32>,
    /// Injected fault: next `n` writes fail as `TransientLedgerError`.
    inject_transient_failures: u32,
    /// If set, the next observe() for this escrow reports the claim as
    /// reorged out (simulates a dropped claim event).
    reorg_escrows: std::collections::HashSet<EscrowId>,
}

impl SimulatorState {
    fn new(clock_ms: Timestamp) -> Self {
        Self {
            escrows: HashMap::new(),
            seen_deposit_nonces: HashMap::new(),
            clock_ms,
            next_escrow_seq: 0,
            confirmations: HashMap::new(),
            inject_transient_failures: 0,
            reorg_escrows: std::collections::HashSet::new(),
        }
    }
}

/// A deterministic in-memory ledger used for development and tests. Time is
/// advanced manually via [`LedgerSimulator::advance_clock`], never read from
/// the wall clock, so scenario tests are fully reproducible.
pub struct LedgerSimulator {
    address: Address,
    confirmations_required: u32,
    hash_algorithm: HashAlgorithm,
    state: Mutex<SimulatorState>,
}

impl LedgerSimulator {
    pub fn new(address: Address, confirmations_required: u32, hash_algorithm: HashAlgorithm, start_clock_ms: Timestamp) -> Self {
        Self {
            address,
            confirmations_required,
            hash_algorithm,
            state: Mutex::new(SimulatorState::new(start_clock_ms)),
        }
    }

    /// Advance the simulated ledger clock. The only source of time movement;
    /// never wall-clock driven.
    pub fn advance_clock(&self, delta_ms: u64) {
        let mut state = self.state.lock().expect("simulator lock poisoned");
        state.clock_ms += delta_ms;
    }

    /// Add confirmations to the most recent claim/deposit tx on `escrow_id`.
    pub fn add_confirmations(&self, tx_id: &LedgerTxId, count: u32) {
        let mut state = self.state.lock().expect("simulator lock poisoned");
        *state.confirmations.entry(tx_id.clone()).or_insert(0) += count;
    }

    /// Cause the next `n` write calls to fail with `TransientLedgerError`.
    pub fn inject_transient_failures(&self, n: u32) {
        let mut state = self.state.lock().expect("simulator lock poisoned");
        state.inject_transient_failures = n;
    }

    /// Mark an escrow's most recent claim as invalidated by a reorg; the
    /// next `observe` call will report it as still `Open` with the claim
    /// reverted.
    pub fn inject_reorg(&self, escrow_id: &EscrowId) {
        let mut state = self.state.lock().expect("simulator lock poisoned");
        state.reorg_escrows.insert(escrow_id.clone());
    }

    fn consume_fault(state: &mut SimulatorState) -> Result<(), AtlockError> {
        if state.inject_transient_failures > 0 {
            state.inject_transient_failures -= 1;
            return Err(AtlockError::TransientLedgerError(
                "simulated RPC timeout".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerAdapter for LedgerSimulator {
    async fn deposit(&self, params: DepositParams) -> Result<DepositResult, AtlockError> {
        let mut state = self.state.lock().expect("simulator lock poisoned");
        Self::consume_fault(&mut state)?;

        if let Some(existing) = state.seen_deposit_nonces.get(&params.nonce).cloned() {
            let escrow = state
                .escrows
                .get(&existing)
                .expect("nonce always maps to a live escrow");
            return Ok(DepositResult {
                escrow_id: existing,
                tx_id: escrow.ledger_tx_deposit.clone(),
                included_at: state.clock_ms,
            });
        }

        let now = state.clock_ms;
        state.next_escrow_seq += 1;
        let escrow_id = EscrowId(format!("sim-escrow-{}", state.next_escrow_seq));
        let tx_id = LedgerTxId(format!("sim-deposit-tx-{}", state.next_escrow_seq));

        let escrow = apply_deposit(
            escrow_id.clone(),
            params.initiator,
            params.redeemer,
            params.secret_hash,
            params.amount,
            params.timelock,
            params.partial_fills_allowed,
            tx_id.clone(),
            now,
        )?;

        state.escrows.insert(escrow_id.clone(), escrow);
        state
            .seen_deposit_nonces
            .insert(params.nonce, escrow_id.clone());

        Ok(DepositResult {
            escrow_id,
            tx_id,
            included_at: now,
        })
    }

    async fn claim(
        &self,
        escrow_id: &EscrowId,
        preimage: [u8; 32],
        amount: Amount,
        caller: Address,
    ) -> Result<ClaimResult, AtlockError> {
        let mut state = self.state.lock().expect("simulator lock poisoned");
        Self::consume_fault(&mut state)?;

        let now = state.clock_ms;
        let hash_algorithm = self.hash_algorithm;
        let seq = {
            state.next_escrow_seq += 1;
            state.next_escrow_seq
        };
        let tx_id = LedgerTxId(format!("sim-claim-tx-{}", seq));

        let escrow = state
            .escrows
            .get_mut(escrow_id)
            .ok_or_else(|| AtlockError::UnknownEscrow(escrow_id.to_string()))?;

        apply_claim(
            escrow,
            &preimage,
            amount,
            &caller,
            now,
            hash_algorithm,
            tx_id.clone(),
        )?;

        Ok(ClaimResult {
            tx_id,
            included_at: now,
            revealed_preimage: preimage,
        })
    }

    async fn refund(
        &self,
        escrow_id: &EscrowId,
        caller: Address,
    ) -> Result<RefundResult, AtlockError> {
        let mut state = self.state.lock().expect("simulator lock poisoned");
        Self::consume_fault(&mut state)?;

        let now = state.clock_ms;
        let seq = {
            state.next_escrow_seq += 1;
            state.next_escrow_seq
        };
        let tx_id = LedgerTxId(format!("sim-refund-tx-{}", seq));

        let escrow = state
            .escrows
            .get_mut(escrow_id)
            .ok_or_else(|| AtlockError::UnknownEscrow(escrow_id.to_string()))?;

        apply_refund(escrow, &caller, now, tx_id.clone())?;

        Ok(RefundResult {
            tx_id,
            included_at: now,
        })
    }

    async fn observe(&self, escrow_id: &EscrowId) -> Result<EscrowSnapshot, AtlockError> {
        let state = self.state.lock().expect("simulator lock poisoned");
        let escrow = state
            .escrows
            .get(escrow_id)
            .ok_or_else(|| AtlockError::UnknownEscrow(escrow_id.to_string()))?;

        if state.reorg_escrows.contains(escrow_id) {
            return Ok(EscrowSnapshot {
                remaining: escrow.deposited,
                claimed_total: 0,
                status: EscrowStatus::Open,
                revealed_preimage: None,
                claim_tx: None,
            });
        }

        if let Some(last_claim_tx) = escrow.ledger_tx_claims.last() {
            let confirmations = state.confirmations.get(last_claim_tx).copied().unwrap_or(0);
            if confirmations < self.confirmations_required && escrow.status == EscrowStatus::FullyClaimed {
                // Claim observed but not yet past the confirmation threshold;
                // report the pre-claim snapshot so the coordinator waits.
                return Ok(EscrowSnapshot {
                    remaining: escrow.deposited,
                    claimed_total: 0,
                    status: EscrowStatus::Open,
                    revealed_preimage: None,
                    claim_tx: None,
                });
            }
        }

        Ok(EscrowSnapshot {
            remaining: escrow.remaining,
            claimed_total: escrow.claimed_total,
            status: escrow.status.clone(),
            revealed_preimage: escrow.revealed_preimage,
            claim_tx: escrow.ledger_tx_claims.last().cloned(),
        })
    }

    async fn now(&self) -> Result<Timestamp, AtlockError> {
        let state = self.state.lock().expect("simulator lock poisoned");
        Ok(state.clock_ms)
    }

    fn explorer_url(&self, tx_id: &LedgerTxId) -> String {
        format!("sim://explorer/tx/{}", tx_id)
    }

    fn address(&self) -> Address {
        self.address.clone()
    }

    async fn balance(&self) -> Result<Amount, AtlockError> {
        let state = self.state.lock().expect("simulator lock poisoned");
        Ok(state
            .escrows
            .values()
            .filter(|e| e.initiator == self.address)
            .map(|e| e.remaining)
            .sum())
    }

    async fn verify_tx(&self, tx_id: &LedgerTxId) -> Result<TxVerification, AtlockError> {
        let state = self.state.lock().expect("simulator lock poisoned");
        let found = state
            .escrows
            .values()
            .any(|e| &e.ledger_tx_deposit == tx_id || e.ledger_tx_claims.contains(tx_id) || e.ledger_tx_refund.as_ref() == Some(tx_id));
        let confirmations = state.confirmations.get(tx_id).copied().unwrap_or(if found { 1 } else { 0 });
        Ok(TxVerification {
            found,
            confirmed: found && confirmations >= self.confirmations_required,
            block_number: if found { Some(1) } else { None },
            status: if found { Some(TxStatus::Ok) } else { None },
        })
    }
}
