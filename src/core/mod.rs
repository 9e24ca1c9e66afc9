//! Core business logic module
//!
//! This module contains the aggregation pipeline, leaves first:
//! - `normalizer` - Lenient parsing of numeric and date fields
//! - `movement_accumulator` - Per-client grouping of lines into movements
//! - `client_accumulator` - Grouping of lines by client with reference enrichment
//! - `finalizer` - Projection of working state into output aggregates
//! - `sorter` - Recency ordering of finalized clients
//! - `engine` - Orchestration of one invocation
//! - `agents` - Rollup of sorted clients by agent
//! - `traits` - The reference lookup seam
//! - `async` - Off-context execution and concurrent batch dispatch

pub mod agents;
pub mod r#async;
pub mod client_accumulator;
pub mod engine;
pub mod finalizer;
pub mod movement_accumulator;
pub mod normalizer;
pub mod sorter;
pub mod traits;

pub use agents::group_by_agent;
pub use client_accumulator::ClientAccumulator;
pub use engine::{aggregate, aggregate_with_diagnostics, filter_by_agent, AggregationEngine};
pub use movement_accumulator::MovementAccumulator;
pub use r#async::{AggregationWorker, BatchDispatcher, BatchJob};
pub use traits::ReferenceLookup;
