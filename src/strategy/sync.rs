//! Synchronous processing strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait. It
//! coordinates between the readers (record and reference input), the
//! [`AggregationEngine`] (business logic) and the JSON writer.
//!
//! CSV input is streamed one row at a time into the engine, so the only
//! state held in memory is the growing client hierarchy itself.

use crate::core::AggregationEngine;
use crate::io::format::InputFormat;
use crate::io::sync_reader::{load_records, SyncReader};
use crate::strategy::{reference_table, write_result, ProcessingRequest, ProcessingStrategy};
use crate::types::{AggregationError, RawRecord};
use std::io::Write;
use tracing::warn;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use client_aggregation_engine::strategy::{
///     ProcessingRequest, ProcessingStrategy, SyncProcessingStrategy,
/// };
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let request = ProcessingRequest::new("records.csv").with_references("clients.csv");
///
/// strategy.process(&request, &mut io::stdout())
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        request: &ProcessingRequest,
        output: &mut dyn Write,
    ) -> Result<(), AggregationError> {
        let references = reference_table(request.references.as_deref())?;
        let mut engine = AggregationEngine::new(&references);

        match InputFormat::detect(&request.input) {
            InputFormat::Json => engine.ingest_all(load_records(&request.input)?),
            InputFormat::Csv => {
                for result in SyncReader::<RawRecord>::new(&request.input)? {
                    match result {
                        Ok(record) => engine.ingest(record),
                        Err(e) => warn!(error = %e, "skipping unreadable record row"),
                    }
                }
            }
        }

        write_result(engine.finish().clients, request, output)
    }
}
