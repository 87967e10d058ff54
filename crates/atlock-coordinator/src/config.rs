use atlock_core::constants::{
    DEFAULT_CONFIRMATIONS, DEFAULT_MAX_RETRIES, DEFAULT_ORDER_RETENTION_MS,
    DEFAULT_RETRY_INITIAL_BACKOFF_MS, DEFAULT_RETRY_MAX_BACKOFF_MS, DEFAULT_SAFETY_MARGIN_MS,
};

/// Coordinator-level policy, independent of any single order. Loaded by the
/// node from its configuration file at startup (§6/§4.12) and handed to the
/// coordinator unchanged for its lifetime.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub safety_margin_ms: u64,
    pub confirmations_a: u32,
    pub confirmations_b: u32,
    pub max_retries: u32,
    pub retry_initial_backoff_ms: u64,
    pub retry_max_backoff_ms: u64,
    pub order_retention_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            safety_margin_ms: DEFAULT_SAFETY_MARGIN_MS,
            confirmations_a: DEFAULT_CONFIRMATIONS,
            confirmations_b: DEFAULT_CONFIRMATIONS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_initial_backoff_ms: DEFAULT_RETRY_INITIAL_BACKOFF_MS,
            retry_max_backoff_ms: DEFAULT_RETRY_MAX_BACKOFF_MS,
            order_retention_ms: DEFAULT_ORDER_RETENTION_MS,
        }
    }
}
