//! atlock-cli
//!
//! Thin operator client for the swap coordinator (C11). Holds no protocol
//! state of its own: every command is a single JSON-RPC round trip against a
//! running atlock-node.
//!
//! Usage:
//!   atlock swap start   --ledger-a <kind> --initiator-a <addr> --redeemer-a <addr> --token-a <id> --amount-a <n> --timelock-a <ms> \
//!                        --ledger-b <kind> --initiator-b <addr> --redeemer-b <addr> --token-b <id> --amount-b <n> --timelock-b <ms> \
//!                        [--hash-algorithm <sha-256|blake2b-256>] [--partial-fills-allowed] [--safety-margin-ms <ms>] --expires-at <ms>
//!   atlock swap status  <order_id>
//!   atlock swap verify  <order_id>
//!   atlock swap refund  <order_id>

use clap::{Parser, Subcommand};

mod rpc_client;
use rpc_client::SwapRpcClient;

/// Exit codes (§6/§7): 0 terminal success, 1 transient/retry, 2 configuration
/// error, 3 fatal inconsistency.
const EXIT_SUCCESS: i32 = 0;
const EXIT_TRANSIENT: i32 = 1;
const EXIT_CONFIG: i32 = 2;
const EXIT_FATAL: i32 = 3;

#[derive(Parser, Debug)]
#[command(name = "atlock", version, about = "Atlock swap-coordinator CLI")]
struct Args {
    /// Node RPC endpoint.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8645")]
    rpc: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Swap order commands.
    Swap {
        #[command(subcommand)]
        action: SwapAction,
    },
}

#[derive(Subcommand, Debug)]
enum SwapAction {
    /// Build a new order and drive it as far as the two deposits get.
    Start {
        #[arg(long)]
        ledger_a: String,
        #[arg(long)]
        initiator_a: String,
        #[arg(long)]
        redeemer_a: String,
        #[arg(long)]
        token_a: String,
        #[arg(long)]
        amount_a: u64,
        #[arg(long)]
        timelock_a: u64,

        #[arg(long)]
        ledger_b: String,
        #[arg(long)]
        initiator_b: String,
        #[arg(long)]
        redeemer_b: String,
        #[arg(long)]
        token_b: String,
        #[arg(long)]
        amount_b: u64,
        #[arg(long)]
        timelock_b: u64,

        #[arg(long, default_value = "sha-256")]
        hash_algorithm: String,
        #[arg(long, default_value_t = false)]
        partial_fills_allowed: bool,
        #[arg(long, default_value_t = 300_000)]
        safety_margin_ms: u64,
        #[arg(long)]
        expires_at: u64,
    },

    /// Fetch an order's current persisted state.
    Status {
        order_id: String,
    },

    /// Re-query both ledgers against a stored order.
    Verify {
        order_id: String,
    },

    /// Operator-forced refund attempt.
    Refund {
        order_id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("warn,atlock_cli=info")
        .init();

    let args = Args::parse();
    let client = SwapRpcClient::new(&args.rpc);

    let exit_code = match run(&client, args.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_CONFIG
        }
    };
    std::process::exit(exit_code);
}

async fn run(client: &SwapRpcClient, command: Command) -> anyhow::Result<i32> {
    let Command::Swap { action } = command;
    match action {
        SwapAction::Start {
            ledger_a,
            initiator_a,
            redeemer_a,
            token_a,
            amount_a,
            timelock_a,
            ledger_b,
            initiator_b,
            redeemer_b,
            token_b,
            amount_b,
            timelock_b,
            hash_algorithm,
            partial_fills_allowed,
            safety_margin_ms,
            expires_at,
        } => {
            let params = serde_json::json!({
                "ledger_a": ledger_a,
                "initiator_a": initiator_a,
                "redeemer_a": redeemer_a,
                "token_a": token_a,
                "amount_a": amount_a,
                "timelock_a": timelock_a,

                "ledger_b": ledger_b,
                "initiator_b": initiator_b,
                "redeemer_b": redeemer_b,
                "token_b": token_b,
                "amount_b": amount_b,
                "timelock_b": timelock_b,

                "hash_algorithm": hash_algorithm,
                "partial_fills_allowed": partial_fills_allowed,
                "safety_margin_ms": safety_margin_ms,
                "expires_at": expires_at,
            });
            match client.start(params).await {
                Ok(order_id) => {
                    println!("order_id: {order_id}");
                    Ok(EXIT_SUCCESS)
                }
                Err(e) => {
                    eprintln!("start failed: {e:#}");
                    Ok(EXIT_TRANSIENT)
                }
            }
        }

        SwapAction::Status { order_id } => {
            let order = client.status(&order_id).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
            Ok(exit_for_status(order["status"].as_str().unwrap_or("")))
        }

        SwapAction::Verify { order_id } => {
            let report = client.verify(&order_id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report["consistent"].as_bool().unwrap_or(false) {
                Ok(EXIT_SUCCESS)
            } else {
                Ok(EXIT_FATAL)
            }
        }

        SwapAction::Refund { order_id } => match client.refund(&order_id).await {
            Ok(()) => {
                println!("refund attempted for {order_id}");
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("refund failed: {e:#}");
                Ok(EXIT_TRANSIENT)
            }
        },
    }
}

/// Map a terminal/non-terminal order status to an exit code (§6).
fn exit_for_status(status: &str) -> i32 {
    match status {
        "completed" | "refunded" => EXIT_SUCCESS,
        "failed" => EXIT_FATAL,
        "expired" => EXIT_TRANSIENT,
        _ => EXIT_TRANSIENT,
    }
}
