//! Concurrent dispatch of independent batches
//!
//! Each batch is a separate engine invocation with private accumulator
//! state; only the read-only reference snapshot is shared. Parallelism is
//! between batches, never inside one, and a semaphore caps how many run at
//! the same time.

use super::AggregationWorker;
use crate::core::traits::ReferenceLookup;
use crate::types::{Aggregation, AggregationError, RawRecord, ReferenceTable};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// One independent batch of records
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Label used in logs (file name, upload id, ...)
    pub name: String,
    pub records: Vec<RawRecord>,
}

impl BatchJob {
    pub fn new(name: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Runs many batch jobs concurrently with a bounded number in flight
#[derive(Debug)]
pub struct BatchDispatcher<L: ?Sized = ReferenceTable> {
    worker: AggregationWorker<L>,
    permits: Arc<Semaphore>,
}

impl<L: ?Sized> Clone for BatchDispatcher<L> {
    fn clone(&self) -> Self {
        Self {
            worker: self.worker.clone(),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<L> BatchDispatcher<L>
where
    L: ReferenceLookup + Send + Sync + ?Sized + 'static,
{
    /// Create a dispatcher
    ///
    /// # Arguments
    ///
    /// * `worker` - Worker whose reference snapshot every job shares
    /// * `max_concurrent_jobs` - Upper bound on jobs in flight (at least 1)
    pub fn new(worker: AggregationWorker<L>, max_concurrent_jobs: usize) -> Self {
        Self {
            worker,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    /// Run every job and return their results in job order
    ///
    /// A failing job does not affect the others: each slot carries its own
    /// `Result`.
    pub async fn dispatch(
        &self,
        jobs: Vec<BatchJob>,
    ) -> Vec<Result<Aggregation, AggregationError>> {
        let runs = jobs.into_iter().map(|job| {
            let worker = self.worker.clone();
            let permits = Arc::clone(&self.permits);

            async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| AggregationError::Worker {
                        message: e.to_string(),
                    })?;

                debug!(job = %job.name, records = job.records.len(), "batch started");
                let result = worker.run(job.records).await;
                if let Err(e) = &result {
                    warn!(job = %job.name, error = %e, "batch failed");
                }
                result
            }
        });

        join_all(runs).await
    }
}
