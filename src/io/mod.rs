//! I/O module
//!
//! Reads raw records and client references, writes the aggregated output.
//!
//! # Components
//!
//! - `format` - Input format detection, JSON decoding, JSON output
//! - `sync_reader` - Synchronous CSV reader with iterator interface, file loaders
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use format::{
    parse_json_records, parse_json_references, write_agents_json, write_clients_json, InputFormat,
};
pub use sync_reader::{load_records, load_references, SyncReader};
