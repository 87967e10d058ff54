//! atlock-rpc
//!
//! JSON-RPC 2.0 server for atlock nodes (C10).
//!
//! Namespace: "atlock"
//! Methods:
//!   atlock_start              — build and lock a new swap order
//!   atlock_status              — fetch an order's current persisted state
//!   atlock_verify               — re-query both ledgers against a stored order
//!   atlock_refund                — operator-forced refund attempt
//!   atlock_subscribeProgress      — stream progress events for one order_id

pub mod api;
pub mod server;
pub mod types;

pub use api::AtlockApiServer;
pub use server::{RpcServer, RpcServerState};
pub use types::{
    RpcEnvelope, RpcOrder, RpcOrderSide, RpcPhaseCheck, RpcProgressEvent, RpcStartParams,
    RpcVerifierReport,
};
