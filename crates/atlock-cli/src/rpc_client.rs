use anyhow::{bail, Context};

/// Simple JSON-RPC 2.0 client used by the CLI to talk to a running node.
///
/// Uses raw HTTP POST with serde_json rather than the full jsonrpsee client
/// to keep the CLI binary lean and dependency-minimal.
pub struct SwapRpcClient {
    url: String,
    client: reqwest::Client,
}

impl SwapRpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to node at {}", self.url))?;

        let json: serde_json::Value = resp.json().await.context("parsing RPC response")?;

        if let Some(err) = json.get("error") {
            bail!("RPC error: {}", err);
        }

        Ok(json["result"].clone())
    }

    /// `atlock_start` — build and lock a new order. Returns the order id, hex.
    pub async fn start(&self, params: serde_json::Value) -> anyhow::Result<String> {
        let result = self.call("atlock_start", serde_json::json!([params])).await?;
        result
            .as_str()
            .map(|s| s.to_string())
            .context("expected order_id string from atlock_start")
    }

    /// `atlock_status` — fetch an order's current persisted state.
    pub async fn status(&self, order_id: &str) -> anyhow::Result<serde_json::Value> {
        self.call("atlock_status", serde_json::json!([order_id])).await
    }

    /// `atlock_verify` — re-query both ledgers against a stored order.
    pub async fn verify(&self, order_id: &str) -> anyhow::Result<serde_json::Value> {
        self.call("atlock_verify", serde_json::json!([order_id])).await
    }

    /// `atlock_refund` — operator-forced refund attempt.
    pub async fn refund(&self, order_id: &str) -> anyhow::Result<()> {
        self.call("atlock_refund", serde_json::json!([order_id])).await?;
        Ok(())
    }
}
