//! Background aggregation worker
//!
//! Runs one engine invocation off the caller's execution context. The batch
//! is moved into a blocking task, the engine runs to completion there, and
//! the complete [`Aggregation`] is moved back. Nothing mutable is shared
//! across the boundary; the reference snapshot is shared read-only.
//!
//! # Architecture
//!
//! ```text
//! caller (async) ──records by value──▶ spawn_blocking ─▶ AggregationEngine
//!        ◀──────────── Aggregation (single complete result) ────┘
//! ```

use crate::core::engine::AggregationEngine;
use crate::core::traits::ReferenceLookup;
use crate::types::{Aggregation, AggregationError, RawRecord, ReferenceTable};
use std::sync::Arc;
use tracing::debug;

/// Dispatches aggregation jobs to tokio's blocking pool
///
/// Cloning a worker is cheap and shares the same reference snapshot.
#[derive(Debug)]
pub struct AggregationWorker<L: ?Sized = ReferenceTable> {
    references: Arc<L>,
}

impl<L: ?Sized> Clone for AggregationWorker<L> {
    fn clone(&self) -> Self {
        Self {
            references: Arc::clone(&self.references),
        }
    }
}

impl<L> AggregationWorker<L>
where
    L: ReferenceLookup + Send + Sync + ?Sized + 'static,
{
    /// Create a worker over a shared reference snapshot
    pub fn new(references: Arc<L>) -> Self {
        Self { references }
    }

    /// Aggregate one batch on the blocking pool
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::Worker`] if the task panicked or the
    /// runtime shut down before it completed. Record content never causes an
    /// error.
    pub async fn run(&self, records: Vec<RawRecord>) -> Result<Aggregation, AggregationError> {
        let references = Arc::clone(&self.references);
        debug!(records = records.len(), "dispatching aggregation job");

        let aggregation = tokio::task::spawn_blocking(move || {
            let mut engine = AggregationEngine::new(references.as_ref());
            engine.ingest_all(records);
            engine.finish()
        })
        .await?;

        Ok(aggregation)
    }
}
