//! Client Aggregation Engine Library
//! # Overview
//!
//! Turns a flat sequence of sales line items plus a client reference table
//! into a Clients → Movements → Details hierarchy with per-client totals,
//! ordered by each client's most recent order. Both a synchronous and an
//! asynchronous (background worker) strategy are provided.
//!
//! # Architecture
//!
//! - [`types`] - Input rows, reference data, output aggregates and errors
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Aggregation pipeline:
//!   - [`core::normalizer`] - Lenient number and date parsing
//!   - [`core::client_accumulator`] - Per-client grouping and enrichment
//!   - [`core::movement_accumulator`] - Per-movement grouping and order dates
//!   - [`core::finalizer`] - Projection into output aggregates
//!   - [`core::sorter`] - Recency ordering
//!   - [`core::engine`] - Orchestration of the stages above
//!   - [`core::agents`] - Per-agent rollup of the sorted clients
//! - [`io`] - JSON and CSV readers, JSON writer
//! - [`strategy`] - Complete pipelines selectable at runtime
//!
//! # Example
//!
//! ```
//! use client_aggregation_engine::{aggregate, RawRecord, ReferenceTable};
//!
//! let record = RawRecord {
//!     client_id: "C1".to_string(),
//!     movement_id: "M1".to_string(),
//!     sold_value: Some("10".to_string()),
//!     document_date: Some("2024-03-01".to_string()),
//!     ..RawRecord::default()
//! };
//!
//! let clients = aggregate(vec![record], &ReferenceTable::new());
//! assert_eq!(clients[0].total_orders, 1);
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    aggregate, aggregate_with_diagnostics, filter_by_agent, group_by_agent, AggregationEngine,
};
pub use io::{write_agents_json, write_clients_json};
pub use types::{
    Agent, Aggregation, AggregationError, Client, ClientId, ClientReference, Detail, Diagnostics,
    Movement, MovementId, RawRecord, ReferenceTable,
};
