//! Read-only, side-effect-free re-query helpers over the Order Record Store
//! and both ledgers, used for audit and the operator-facing verify command.

pub mod query;
pub mod verifier;

pub use query::OrderQuery;
pub use verifier::{verify_order, PhaseCheck, VerifierReport};
