//! The Atomic Swap Coordinator (C7): drives a pair of escrows through the
//! two-phase lock/claim protocol on top of the Ledger Adapter interface and
//! the Order Record Store, publishing progress over the event bus.

pub mod config;
pub mod coordinator;
pub mod nonce;
pub mod params;
pub mod recovery;

pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use nonce::step_nonce;
pub use params::{new_order, Receipt, StartParams};
pub use recovery::recover_non_terminal_orders;
