//! atlock-node — the swap-coordinator daemon.
//!
//! Startup sequence:
//!   1. Load and validate configuration (fail fast on category-1 errors)
//!   2. Open the order record store
//!   3. Build the two ledger simulators and the coordinator
//!   4. Replay crash recovery for any non-terminal orders
//!   5. Start the JSON-RPC 2.0 server
//!   6. Run the re-drive loop: every tick, re-invoke `drive()` for every
//!      non-terminal order, which is both the normal progress mechanism and
//!      ongoing crash recovery — there is no separate resume path.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use atlock_config::Config;
use atlock_coordinator::{recover_non_terminal_orders, Coordinator, CoordinatorConfig};
use atlock_core::types::Address;
use atlock_rpc::{RpcServer, RpcServerState};
use atlock_state::{LedgerAdapter, LedgerSimulator, OrderStore};
use atlock_stream::EventBus;

#[derive(Parser, Debug)]
#[command(
    name = "atlock-node",
    version,
    about = "Atlock swap-coordinator node — binds an L1 ledger and an L2 ledger via HTLC escrow"
)]
struct Args {
    /// Path to the node's configuration file (JSON). If omitted, built-in
    /// defaults plus `ATLOCK_*` environment overrides are used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How often the re-drive loop re-checks non-terminal orders.
    #[arg(long, default_value_t = 2_000)]
    poll_interval_ms: u64,
}

fn coordinator_config(config: &Config) -> CoordinatorConfig {
    CoordinatorConfig {
        safety_margin_ms: config.safety_margin_ms,
        confirmations_a: config.confirmations_a,
        confirmations_b: config.confirmations_b,
        max_retries: config.max_retries,
        retry_initial_backoff_ms: config.retry_initial_backoff_ms,
        retry_max_backoff_ms: config.retry_max_backoff_ms,
        order_retention_ms: config.order_retention_ms,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,atlock=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("atlock node starting");

    // ── Configuration (category 1 — fail fast) ──────────────────────────────
    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            warn!("no --config provided, using built-in defaults plus ATLOCK_* environment overrides");
            Config::load_defaults().context("validating default configuration")?
        }
    };
    let hash_algorithm = config.hash_algorithm().context("resolving hash algorithm")?;

    // ── Order record store ───────────────────────────────────────────────────
    std::fs::create_dir_all(&config.store_path)
        .with_context(|| format!("creating store directory {}", config.store_path))?;
    let store = OrderStore::open(&config.store_path).context("opening order store")?;

    // ── Ledger simulators ─────────────────────────────────────────────────────
    // Only an in-memory simulator ships in this repo; a real adapter against
    // an L1/L2 ledger is an external collaborator behind the same trait.
    let adapter_a: Arc<dyn LedgerAdapter> = Arc::new(LedgerSimulator::new(
        Address("node-a".into()),
        config.confirmations_a,
        hash_algorithm,
        0,
    ));
    let adapter_b: Arc<dyn LedgerAdapter> = Arc::new(LedgerSimulator::new(
        Address("node-b".into()),
        config.confirmations_b,
        hash_algorithm,
        0,
    ));

    let events = Arc::new(EventBus::new(256));

    let coordinator = Arc::new(Coordinator::new(
        store,
        Arc::clone(&adapter_a),
        Arc::clone(&adapter_b),
        Arc::clone(&events),
        coordinator_config(&config),
    ));

    // ── Crash recovery ────────────────────────────────────────────────────────
    let recovered = recover_non_terminal_orders(&coordinator)
        .await
        .context("replaying crash recovery")?;
    info!(recovered, "crash recovery complete");

    // ── RPC server ────────────────────────────────────────────────────────────
    let rpc_state = Arc::new(RpcServerState {
        coordinator: Arc::clone(&coordinator),
        adapter_a: Arc::clone(&adapter_a),
        adapter_b: Arc::clone(&adapter_b),
        events: Arc::clone(&events),
    });
    let rpc_addr = config
        .rpc_listen_addr
        .parse()
        .context("parsing rpc_listen_addr")?;
    let _rpc_handle = RpcServer::new(rpc_state)
        .start(rpc_addr)
        .await
        .context("starting RPC server")?;

    // ── Re-drive loop ─────────────────────────────────────────────────────────
    // Every tick, resume every non-terminal order from wherever its status
    // left it. This is the only place progress is made past the first ledger
    // call of each phase; restarting the node just means this loop starts
    // later, which is why crash recovery above and this loop share the same
    // `drive()` entry point.
    info!(poll_interval_ms = args.poll_interval_ms, "node ready");
    let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_interval_ms));
    loop {
        ticker.tick().await;
        let pending = match coordinator.store().iter_non_terminal_orders() {
            Ok(orders) => orders,
            Err(e) => {
                warn!(error = %e, "failed to scan non-terminal orders");
                continue;
            }
        };
        for order in pending {
            let order_id = order.order_id.clone();
            if let Err(e) = coordinator.drive(order_id.clone()).await {
                if e.is_transient() {
                    warn!(order_id = %order_id, error = %e, "transient error driving order, will retry next tick");
                } else {
                    warn!(order_id = %order_id, error = %e, "error driving order");
                }
            }
        }
    }
}
