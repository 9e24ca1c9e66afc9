//! Asynchronous processing strategy
//!
//! Runs the aggregation off the calling thread. Input is read with async
//! file I/O, CSV rows are decoded in batches, and the complete record
//! sequence is handed to an [`AggregationWorker`] which runs the engine on
//! tokio's blocking pool and returns one complete result.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── WorkerConfig (batch_size, max_concurrent_jobs)
//!     ├── AsyncReader (batched CSV decoding)
//!     └── AggregationWorker (engine on the blocking pool)
//!             └── Arc<ReferenceTable> (read-only snapshot)
//! ```
//!
//! The engine consumes the whole record sequence in one run; batches only
//! bound how many rows are decoded per read.

use crate::core::AggregationWorker;
use crate::io::async_reader::AsyncReader;
use crate::io::format::{parse_json_records, InputFormat};
use crate::strategy::{reference_table, write_result, ProcessingRequest, ProcessingStrategy};
use crate::types::{AggregationError, RawRecord};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for the background worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Number of CSV rows decoded per read
    pub batch_size: usize,
    /// Worker threads of the runtime, and the bound on concurrent jobs
    pub max_concurrent_jobs: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_jobs: num_cpus::get(),
        }
    }
}

impl WorkerConfig {
    /// Create a new WorkerConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_jobs: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_jobs = if max_concurrent_jobs == 0 {
            warn!(
                max_concurrent_jobs,
                default = default.max_concurrent_jobs,
                "invalid max_concurrent_jobs, using default"
            );
            default.max_concurrent_jobs
        } else {
            max_concurrent_jobs
        };

        Self {
            batch_size,
            max_concurrent_jobs,
        }
    }
}

/// Asynchronous processing strategy
///
/// AsyncProcessingStrategy is Send + Sync. Each call to `process` builds its
/// own multi-threaded runtime sized by `max_concurrent_jobs`.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: WorkerConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    async fn read_records(&self, path: &Path) -> Result<Vec<RawRecord>, AggregationError> {
        match InputFormat::detect(path) {
            InputFormat::Json => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| AggregationError::open_failed(path, e))?;
                parse_json_records(&bytes)
            }
            InputFormat::Csv => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| AggregationError::open_failed(path, e))?;

                // csv-async reads through the futures io traits
                let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
                let mut reader = AsyncReader::new(compat_file);

                let records = reader.read_to_end(self.config.batch_size).await;
                debug!(records = records.len(), "decoded CSV records");
                Ok(records)
            }
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Run the asynchronous pipeline
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Loads the reference snapshot on the blocking pool
    /// 3. Reads the raw records (batched for CSV)
    /// 4. Aggregates on an [`AggregationWorker`]
    /// 5. Applies the agent filter and grouping and writes the JSON document
    fn process(
        &self,
        request: &ProcessingRequest,
        output: &mut dyn Write,
    ) -> Result<(), AggregationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_jobs)
            .build()
            .map_err(|e| AggregationError::Worker {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let aggregation = runtime.block_on(async {
            let references_path = request.references.clone();
            let references =
                tokio::task::spawn_blocking(move || reference_table(references_path.as_deref()))
                    .await??;

            let records = self.read_records(&request.input).await?;

            let worker = AggregationWorker::new(Arc::new(references));
            worker.run(records).await
        })?;

        write_result(aggregation.clients, request, output)
    }
}
