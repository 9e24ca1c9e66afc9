//! Processing strategy module
//!
//! Defines the Strategy pattern for complete aggregation pipelines, from
//! reading the record and reference files through the engine to the JSON
//! output. The synchronous and asynchronous implementations are selected at
//! runtime and produce identical output for the same input.

use crate::cli::StrategyType;
use crate::core::{filter_by_agent, group_by_agent};
use crate::io::format::{write_agents_json, write_clients_json};
use crate::io::sync_reader::load_references;
use crate::types::{AggregationError, Client, ReferenceTable};
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, WorkerConfig};
pub use sync::SyncProcessingStrategy;

/// Everything a strategy needs to know about one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingRequest {
    /// Raw record file (JSON array or CSV)
    pub input: PathBuf,
    /// Client reference file; without it every client gets empty reference fields
    pub references: Option<PathBuf>,
    /// Keep only clients whose first line item carries this agent id
    pub agent: Option<String>,
    /// Write the per-agent rollup instead of the flat client list
    pub group_by_agent: bool,
}

impl ProcessingRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_references(mut self, references: impl Into<PathBuf>) -> Self {
        self.references = Some(references.into());
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_agent_grouping(mut self) -> Self {
        self.group_by_agent = true;
        self
    }
}

/// Processing strategy trait for complete aggregation pipelines
///
/// Each strategy reads the raw records named by the request, aggregates them
/// against the reference table, and writes the ordered client hierarchy as a
/// JSON array to the provided output.
pub trait ProcessingStrategy: Send + Sync {
    /// Run one aggregation and write the result to `output`
    ///
    /// # Arguments
    ///
    /// * `request` - Input, reference and filter settings for this run
    /// * `output` - Writer receiving the JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input file cannot be opened or read
    /// - A JSON input does not hold an array of records
    /// - The background worker fails
    /// - Output cannot be written
    ///
    /// Malformed individual rows and fields are not errors. Rows are skipped
    /// with a warning and fields degrade to their defaults.
    fn process(
        &self,
        request: &ProcessingRequest,
        output: &mut dyn Write,
    ) -> Result<(), AggregationError>;
}

/// Load the reference table named by a request, or an empty one
pub(crate) fn reference_table(path: Option<&Path>) -> Result<ReferenceTable, AggregationError> {
    match path {
        Some(path) => load_references(path),
        None => Ok(ReferenceTable::new()),
    }
}

/// Apply the request's agent filter and output shape, then write
pub(crate) fn write_result(
    clients: Vec<Client>,
    request: &ProcessingRequest,
    output: &mut dyn Write,
) -> Result<(), AggregationError> {
    let clients = match request.agent.as_deref() {
        Some(agent) => filter_by_agent(clients, agent),
        None => clients,
    };

    if request.group_by_agent {
        write_agents_json(&group_by_agent(clients), output)
    } else {
        write_clients_json(&clients, output)
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional worker configuration (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<WorkerConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config.unwrap_or_default())),
    }
}
