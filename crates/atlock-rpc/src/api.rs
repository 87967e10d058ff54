use jsonrpsee::core::{RpcResult, SubscriptionResult};
use jsonrpsee::proc_macros::rpc;

use crate::types::{RpcOrder, RpcStartParams, RpcVerifierReport};

/// Atlock swap-coordinator JSON-RPC 2.0 API definition.
///
/// All method names are prefixed with "atlock_" via `namespace = "atlock"`.
#[rpc(server, namespace = "atlock")]
pub trait AtlockApi {
    /// Build a new order from `params`, validate the timelock ordering
    /// invariant, and drive it to `BOTH_LOCKED` (or as far as the two
    /// deposits get). Returns the new order's id, hex-encoded.
    #[method(name = "start")]
    async fn swap_start(&self, params: RpcStartParams) -> RpcResult<String>;

    /// Return the current persisted state of `order_id`.
    #[method(name = "status")]
    async fn swap_status(&self, order_id: String) -> RpcResult<RpcOrder>;

    /// Re-query both ledgers against the stored order and report whether
    /// every phase implied by its recorded status actually landed.
    #[method(name = "verify")]
    async fn swap_verify(&self, order_id: String) -> RpcResult<RpcVerifierReport>;

    /// Operator-forced refund attempt on whichever sides of `order_id` are
    /// past their own timelock and still hold funds.
    #[method(name = "refund")]
    async fn swap_refund(&self, order_id: String) -> RpcResult<()>;

    /// Stream progress events for `order_id`, starting from the moment of
    /// subscription. Delivery is at-least-once; subscribers must dedup by
    /// `(order_id, seq)`.
    #[subscription(name = "subscribeProgress" => "progress", unsubscribe = "unsubscribeProgress", item = crate::types::RpcEnvelope)]
    async fn subscribe_progress(&self, order_id: String) -> SubscriptionResult;
}
