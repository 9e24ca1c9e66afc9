//! Synchronous readers for record and reference files
//!
//! Provides a streaming iterator over typed rows of a CSV file, plus loaders
//! that read a whole records or reference file in either supported format.
//!
//! # Iterator Interface
//!
//! [`SyncReader`] implements `Iterator`, yielding `Result<T, String>` for
//! each CSV row:
//!
//! ```no_run
//! use client_aggregation_engine::io::sync_reader::SyncReader;
//! use client_aggregation_engine::types::RawRecord;
//! use std::path::Path;
//!
//! let reader = SyncReader::<RawRecord>::new(Path::new("records.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Line item for client {}", record.client_id),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()` and
//!   the loaders
//! - Individual row errors are yielded as `Err` with the line number; the
//!   loaders log and skip them

use crate::io::format::{from_text_columns, parse_json_records, parse_json_references, InputFormat};
use crate::types::{AggregationError, ClientReference, RawRecord, ReferenceTable};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous CSV reader
///
/// Reads one row at a time; memory use does not grow with file size.
#[derive(Debug)]
pub struct SyncReader<T = RawRecord> {
    reader: csv::Reader<File>,
    line_num: usize,
    _row: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> SyncReader<T> {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields and headers
    /// - Allow flexible field counts (exports often drop trailing cells)
    /// - Use an 8KB buffer for efficient I/O
    pub fn new(path: &Path) -> Result<Self, AggregationError> {
        let file = File::open(path).map_err(|e| AggregationError::open_failed(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
            _row: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> Iterator for SyncReader<T> {
    type Item = Result<T, String>;

    /// Read and convert the next row
    ///
    /// Line numbers in errors count the header as line 1.
    fn next(&mut self) -> Option<Self::Item> {
        let mut rows = self.reader.deserialize::<HashMap<String, String>>();

        let row = rows.next()?;
        self.line_num += 1;
        let line = self.line_num + 1;

        Some(match row {
            Ok(columns) => from_text_columns(columns).map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}

/// Read every row of a CSV file, skipping (and logging) unreadable rows
fn read_csv<T: DeserializeOwned>(path: &Path, source_name: &str) -> Result<Vec<T>, AggregationError> {
    let mut rows = Vec::new();
    for result in SyncReader::<T>::new(path)? {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!(source = source_name, error = %e, "skipping unreadable row"),
        }
    }
    Ok(rows)
}

/// Load the complete raw record sequence from a JSON or CSV file
///
/// # Errors
///
/// - `FileNotFound` / `IoError` if the file cannot be read
/// - `InputContract` if a JSON file does not hold an array
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, AggregationError> {
    let records = match InputFormat::detect(path) {
        InputFormat::Json => {
            let bytes = std::fs::read(path).map_err(|e| AggregationError::open_failed(path, e))?;
            parse_json_records(&bytes)?
        }
        InputFormat::Csv => read_csv(path, "records")?,
    };

    info!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}

/// Load a client reference table from a JSON or CSV file
///
/// Same error contract as [`load_records`].
pub fn load_references(path: &Path) -> Result<ReferenceTable, AggregationError> {
    let references: Vec<ClientReference> = match InputFormat::detect(path) {
        InputFormat::Json => {
            let bytes = std::fs::read(path).map_err(|e| AggregationError::open_failed(path, e))?;
            parse_json_references(&bytes)?
        }
        InputFormat::Csv => read_csv(path, "references")?,
    };

    let table: ReferenceTable = references.into_iter().collect();
    info!(path = %path.display(), clients = table.len(), "loaded reference table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    /// Helper function to create a temporary file with the given extension
    fn create_temp_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_fails_on_missing_file() {
        let result = SyncReader::<RawRecord>::new(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(AggregationError::FileNotFound { .. })));
    }

    #[test]
    fn test_sync_reader_iterates_records() {
        let csv_content = "client_id,client_name,movement_id,article_id,sold_value,document_date\n\
                           C1,Client One,M1,A1,10.00,2024-03-01\n\
                           C1,Client One,M1,A2,5.00,2024-03-05\n";
        let file = create_temp_file(csv_content, ".csv");

        let records: Vec<_> = SyncReader::<RawRecord>::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        let first = records[0].as_ref().unwrap();
        assert_eq!(first.client_id, "C1");
        assert_eq!(first.client_name, "Client One");
        assert_eq!(first.sold_value.as_deref(), Some("10.00"));
        assert_eq!(first.document_date.as_deref(), Some("2024-03-01"));
        assert_eq!(first.quantity, None);
    }

    #[test]
    fn test_sync_reader_native_headers_and_whitespace() {
        let csv_content = "Codice Cliente , Numero Lista , Valore , Mese\n  0042  ,  12170 ,  141.6 , 4\n";
        let file = create_temp_file(csv_content, ".csv");

        let records: Vec<_> = SyncReader::<RawRecord>::new(file.path())
            .unwrap()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].client_id, "0042");
        assert_eq!(records[0].movement_id, "12170");
        assert_eq!(records[0].sold_value.as_deref(), Some("141.6"));
    }

    #[test]
    fn test_sync_reader_short_rows_default_missing_cells() {
        let csv_content = "client_id,movement_id,sold_value,document_date\nC1,M1\nC2,M2,3.00,2024-01-01\n";
        let file = create_temp_file(csv_content, ".csv");

        let records: Vec<_> = SyncReader::<RawRecord>::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        let short = records[0].as_ref().unwrap();
        assert_eq!(short.client_id, "C1");
        assert_eq!(short.sold_value, None);
        assert!(records[1].is_ok());
    }

    #[test]
    fn test_sync_reader_reports_line_numbers() {
        // Second data row repeats a column under both its names
        let csv_content = "client_id,Codice Cliente\nC1\nC2,C2\n";
        let file = create_temp_file(csv_content, ".csv");

        let records: Vec<_> = SyncReader::<RawRecord>::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        assert!(records[0].is_ok());
        let error = records[1].as_ref().unwrap_err();
        assert!(error.contains("Line 3"), "unexpected error: {}", error);
    }

    #[test]
    fn test_sync_reader_empty_file_after_header() {
        let file = create_temp_file("client_id,movement_id\n", ".csv");

        let records: Vec<_> = SyncReader::<RawRecord>::new(file.path()).unwrap().collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_records_json() {
        let json = r#"[{"Codice Cliente": 2709, "Numero Lista": 12170, "Valore": 141.6}]"#;
        let file = create_temp_file(json, ".json");

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].client_id, "2709");
    }

    #[test]
    fn test_load_records_json_contract_violation() {
        let file = create_temp_file(r#"{"records": []}"#, ".json");

        let result = load_records(file.path());
        assert!(matches!(result, Err(AggregationError::InputContract { .. })));
    }

    #[test]
    fn test_load_records_missing_file() {
        let result = load_records(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(AggregationError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_references_csv() {
        let csv_content = "CODICE,INDIRIZZO,TELEFONO,PARTITA IVA\n\
                           C1,VIA ROMA 1,0951234567,01234567890\n\
                           C2,,,\n";
        let file = create_temp_file(csv_content, ".csv");

        let table = load_references(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        let c1 = table.get("C1").unwrap();
        assert_eq!(c1.phone.as_deref(), Some("0951234567"));
        assert_eq!(c1.tax_code.as_deref(), Some("01234567890"));
        assert_eq!(table.get("C2").unwrap().address, None);
    }

    #[test]
    fn test_load_references_json() {
        let json = r#"[{"CODICE": "C1", "EMAIL": "a@example.com"}]"#;
        let file = create_temp_file(json, ".json");

        let table = load_references(file.path()).unwrap();
        assert_eq!(
            table.get("C1").and_then(|r| r.email.as_deref()),
            Some("a@example.com")
        );
    }
}
