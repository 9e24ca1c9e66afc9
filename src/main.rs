//! Client Aggregation Engine CLI
//!
//! Turns a flat export of sales line items into a per-client order history.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- records.json > clients.json
//! cargo run -- --references clients.csv records.csv > clients.json
//! cargo run -- --strategy sync --agent 11 records.csv > clients.json
//! cargo run -- --group-by-agent records.csv > agents.json
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 records.csv
//! ```
//!
//! The JSON document goes to stdout; logs go to stderr and are controlled
//! with `RUST_LOG` (default `warn`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (input not found or unreadable, input is not a record array, etc.)

use client_aggregation_engine::cli;
use client_aggregation_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_worker_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), config)
    };

    let mut output = std::io::stdout().lock();
    if let Err(e) = strategy.process(&args.to_request(), &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
