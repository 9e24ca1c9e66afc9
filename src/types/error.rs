//! Error types for the aggregation engine
//!
//! Field- and record-level problems never surface here: the engine degrades
//! them to empty strings, zeros and date sentinels and keeps going. These
//! variants only cover conditions that stop an invocation as a whole.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Unreadable CSV structure
//! - **Input-Contract Violations**: The record sequence itself is not a sequence
//! - **Worker Errors**: The background aggregation task did not complete
//! - **Output Errors**: The aggregated result could not be written

use thiserror::Error;

/// Main error type for the aggregation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Individual malformed rows are skipped by the readers; this variant is
    /// reserved for errors that prevent reading the file at all.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// The input is not a sequence of records
    ///
    /// Reported once, before any accumulation begins. The caller must treat
    /// this as "engine could not run", never as partial data.
    #[error("Input contract violation in {source_name}: {message}")]
    InputContract {
        /// Which input was malformed (records file, reference table, ...)
        source_name: String,
        /// What was found instead of a record sequence
        message: String,
    },

    /// The background aggregation task failed to produce a result
    #[error("Aggregation worker failed: {message}")]
    Worker {
        /// Description of the failure (panic, cancelled runtime, ...)
        message: String,
    },

    /// The aggregated output could not be serialized or written
    #[error("Failed to write output: {message}")]
    Output {
        /// Description of the write failure
        message: String,
    },
}

// Conversion from io::Error to AggregationError
impl From<std::io::Error> for AggregationError {
    fn from(error: std::io::Error) -> Self {
        AggregationError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to AggregationError
impl From<csv::Error> for AggregationError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        AggregationError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Conversion from csv_async::Error to AggregationError
impl From<csv_async::Error> for AggregationError {
    fn from(error: csv_async::Error) -> Self {
        AggregationError::ParseError {
            line: None,
            message: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for AggregationError {
    fn from(error: tokio::task::JoinError) -> Self {
        let message = if error.is_panic() {
            format!("task panicked: {}", error)
        } else {
            format!("task cancelled: {}", error)
        };
        AggregationError::Worker { message }
    }
}

// Helper functions for creating common errors

impl AggregationError {
    /// Create an InputContract error
    pub fn input_contract(source_name: &str, message: impl Into<String>) -> Self {
        AggregationError::InputContract {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// Create an error for a file that could not be opened
    ///
    /// A missing file maps to `FileNotFound`, every other failure to `IoError`
    /// with the path included in the message.
    pub fn open_failed(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            AggregationError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            AggregationError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            }
        }
    }

    /// Create an Output error
    pub fn output(message: impl std::fmt::Display) -> Self {
        AggregationError::Output {
            message: message.to_string(),
        }
    }
}
