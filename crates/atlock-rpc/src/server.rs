use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult, SubscriptionResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use jsonrpsee::{PendingSubscriptionSink, SubscriptionMessage};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use atlock_coordinator::{new_order, Coordinator};
use atlock_core::types::OrderId;
use atlock_state::LedgerAdapter;
use atlock_stream::EventBus;

use crate::api::AtlockApiServer;
use crate::types::{RpcEnvelope, RpcOrder, RpcStartParams, RpcVerifierReport};

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

fn parse_order_id(hex: &str) -> RpcResult<OrderId> {
    OrderId::from_hex(hex).map_err(|e| rpc_err(-32602, format!("invalid order id: {e}")))
}

/// Shared state passed to the RPC server.
pub struct RpcServerState {
    pub coordinator: Arc<Coordinator>,
    pub adapter_a: Arc<dyn LedgerAdapter>,
    pub adapter_b: Arc<dyn LedgerAdapter>,
    pub events: Arc<EventBus>,
}

/// The RPC server implementation.
pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr` with permissive CORS headers.
    /// Returns a handle to stop it.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
        let cors = CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any)
            .allow_headers(Any);

        let server = Server::builder()
            .set_http_middleware(tower::ServiceBuilder::new().layer(cors))
            .build(addr)
            .await?;

        let module = self.into_rpc();
        let handle = server.start(module);
        info!(%addr, "RPC server started");
        Ok(handle)
    }
}

#[async_trait]
impl AtlockApiServer for RpcServer {
    async fn swap_start(&self, params: RpcStartParams) -> RpcResult<String> {
        let params = params
            .into_start_params()
            .map_err(|e| rpc_err(-32602, e))?;

        let created_at = chrono::Utc::now().timestamp_millis() as u64;
        let order = new_order(params, created_at).map_err(|e| rpc_err(-32603, e.to_string()))?;
        let order_id = order.order_id.to_hex();

        self.state
            .coordinator
            .start(order)
            .await
            .map_err(|e| rpc_err(-32603, e.to_string()))?;

        Ok(order_id)
    }

    async fn swap_status(&self, order_id: String) -> RpcResult<RpcOrder> {
        let id = parse_order_id(&order_id)?;
        let order = self
            .state
            .coordinator
            .store()
            .get_order(&id)
            .map_err(|e| rpc_err(-32603, e.to_string()))?
            .ok_or_else(|| rpc_err(-32000, format!("order not found: {order_id}")))?;
        Ok(RpcOrder::from(&order))
    }

    async fn swap_verify(&self, order_id: String) -> RpcResult<RpcVerifierReport> {
        let id = parse_order_id(&order_id)?;
        let report = atlock_verify::verify_order(
            &id,
            self.state.coordinator.store(),
            self.state.adapter_a.as_ref(),
            self.state.adapter_b.as_ref(),
        )
        .await
        .map_err(|e| rpc_err(-32603, e.to_string()))?;
        Ok(RpcVerifierReport::from(&report))
    }

    async fn swap_refund(&self, order_id: String) -> RpcResult<()> {
        let id = parse_order_id(&order_id)?;
        self.state
            .coordinator
            .attempt_refund(&id)
            .await
            .map_err(|e| rpc_err(-32603, e.to_string()))
    }

    async fn subscribe_progress(
        &self,
        pending: PendingSubscriptionSink,
        order_id: String,
    ) -> SubscriptionResult {
        let filter = parse_order_id(&order_id)?;
        let sink = pending.accept().await?;
        let mut rx = self.state.events.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(envelope) if envelope.order_id == filter => {
                        let rpc_envelope = RpcEnvelope::from(&envelope);
                        let message = match SubscriptionMessage::from_json(&rpc_envelope) {
                            Ok(m) => m,
                            Err(_) => continue,
                        };
                        if sink.send(message).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "progress subscriber lagged, some events were dropped");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(())
    }
}
