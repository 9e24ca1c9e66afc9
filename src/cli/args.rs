use crate::strategy::{ProcessingRequest, WorkerConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Aggregate sales line items into a per-client order history
#[derive(Parser, Debug)]
#[command(name = "client-aggregation-engine")]
#[command(
    about = "Aggregate sales line items into clients, movements and details ordered by recency",
    long_about = None
)]
pub struct CliArgs {
    /// Raw record file (JSON array or CSV)
    #[arg(value_name = "INPUT", help = "Path to the raw record file (.json or .csv)")]
    pub input_file: PathBuf,

    /// Client reference file used for enrichment
    #[arg(
        long = "references",
        value_name = "FILE",
        help = "Path to the client reference file (.json or .csv)"
    )]
    pub references: Option<PathBuf>,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' runs inline, 'async' runs on a background worker"
    )]
    pub strategy: StrategyType,

    /// Number of CSV rows decoded per read (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of CSV rows decoded per read (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of concurrent worker jobs (default: CPU cores)"
    )]
    pub max_concurrent_jobs: Option<usize>,

    /// Restrict output to one agent's clients
    #[arg(
        long = "agent",
        value_name = "AGENT_ID",
        help = "Only output clients whose first line item carries this agent id"
    )]
    pub agent: Option<String>,

    /// Output the per-agent rollup instead of the flat client list
    #[arg(
        long = "group-by-agent",
        help = "Group clients by agent in the output, keeping recency order within each agent"
    )]
    pub group_by_agent: bool,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Build a WorkerConfig from the CLI arguments, defaulting what is absent
    ///
    /// Zero values are replaced by defaults with a warning.
    pub fn to_worker_config(&self) -> WorkerConfig {
        if self.batch_size.is_none() && self.max_concurrent_jobs.is_none() {
            return WorkerConfig::default();
        }

        let default = WorkerConfig::default();
        WorkerConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_jobs.unwrap_or(default.max_concurrent_jobs),
        )
    }

    /// The processing request described by the CLI arguments
    pub fn to_request(&self) -> ProcessingRequest {
        ProcessingRequest {
            input: self.input_file.clone(),
            references: self.references.clone(),
            agent: self.agent.clone(),
            group_by_agent: self.group_by_agent,
        }
    }
}
