pub mod simulator;
pub mod store;

pub use simulator::{
    ClaimResult, DepositParams, DepositResult, EscrowSnapshot, LedgerAdapter, LedgerSimulator,
    RefundResult, TxStatus, TxVerification,
};
pub use store::OrderStore;
