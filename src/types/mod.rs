//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `record`: Raw transaction line-items as supplied by the caller
//! - `reference`: Client reference data and its lookup snapshot
//! - `aggregate`: Derived Client / Movement / Detail output types
//! - `error`: Error types for the aggregation engine

pub mod aggregate;
pub mod error;
pub mod record;
pub mod reference;

pub use aggregate::{Agent, Aggregation, Client, Detail, Diagnostics, Movement};
pub use error::AggregationError;
pub use record::{ClientId, MovementId, RawRecord};
pub use reference::{ClientReference, ReferenceTable};
