//! Input and output format handling
//!
//! This module centralizes format concerns, providing:
//! - Input format detection by file extension
//! - JSON record and reference parsing, including the input-contract check
//! - Conversion of textual CSV rows into typed input records
//! - Client output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{Agent, AggregationError, Client, ClientReference, RawRecord};
use serde::de::value::{Error as ValueError, MapDeserializer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A JSON array of objects
    Json,
    /// A CSV file with a header row
    Csv,
}

impl InputFormat {
    /// Detect the format from the file extension
    ///
    /// `.json` (any case) is JSON; everything else is read as CSV.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

/// Convert a CSV row (header → cell text) into a typed input record
///
/// Cells stay text all the way through, so identifiers and phone numbers
/// with leading zeros are preserved.
pub fn from_text_columns<T: DeserializeOwned>(
    columns: HashMap<String, String>,
) -> Result<T, String> {
    T::deserialize(MapDeserializer::<_, ValueError>::new(columns.into_iter()))
        .map_err(|e| e.to_string())
}

/// Parse a JSON document holding the raw record sequence
///
/// # Errors
///
/// Returns [`AggregationError::InputContract`] if the document is not valid
/// JSON or its top-level value is not an array. Elements that are not record
/// objects are skipped with a warning.
pub fn parse_json_records(bytes: &[u8]) -> Result<Vec<RawRecord>, AggregationError> {
    parse_json_sequence(bytes, "records")
}

/// Parse a JSON document holding the client reference table
///
/// Same contract as [`parse_json_records`].
pub fn parse_json_references(bytes: &[u8]) -> Result<Vec<ClientReference>, AggregationError> {
    parse_json_sequence(bytes, "references")
}

fn parse_json_sequence<T: DeserializeOwned>(
    bytes: &[u8],
    source_name: &str,
) -> Result<Vec<T>, AggregationError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| AggregationError::input_contract(source_name, e.to_string()))?;

    let items = match document {
        Value::Array(items) => items,
        other => {
            return Err(AggregationError::input_contract(
                source_name,
                format!("expected an array, found {}", json_kind(&other)),
            ))
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!(
                source = source_name,
                index,
                kind = json_kind(&item),
                "skipping element that is not an object"
            );
            continue;
        }
        match serde_json::from_value::<T>(item) {
            Ok(value) => parsed.push(value),
            Err(e) => warn!(source = source_name, index, error = %e, "skipping malformed element"),
        }
    }

    Ok(parsed)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Write clients as a pretty-printed JSON array followed by a newline
///
/// Clients are written in the order given; the engine has already sorted
/// them by recency.
pub fn write_clients_json(clients: &[Client], output: &mut dyn Write) -> Result<(), AggregationError> {
    write_json(clients, output)
}

/// Write the agent rollup as a pretty-printed JSON array
pub fn write_agents_json(agents: &[Agent], output: &mut dyn Write) -> Result<(), AggregationError> {
    write_json(agents, output)
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: &mut dyn Write) -> Result<(), AggregationError> {
    serde_json::to_writer_pretty(&mut *output, value).map_err(AggregationError::output)?;
    writeln!(output).map_err(AggregationError::output)?;
    output.flush().map_err(AggregationError::output)?;

    Ok(())
}
