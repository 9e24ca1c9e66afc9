//! Off-context execution of the aggregation engine
//!
//! The engine itself is synchronous and single-threaded. This module moves
//! invocations onto tokio's blocking pool so an async caller is never
//! blocked by a large batch:
//!
//! - **AggregationWorker**: runs one batch in isolation and returns one result
//! - **BatchDispatcher**: runs many independent batches with bounded concurrency

pub mod dispatcher;
pub mod worker;

pub use dispatcher::{BatchDispatcher, BatchJob};
pub use worker::AggregationWorker;
