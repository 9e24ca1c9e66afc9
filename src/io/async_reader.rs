//! Asynchronous CSV reader with batch interface
//!
//! Streams raw records out of a CSV source in fixed-size batches so the
//! aggregation worker can be fed without holding more than one batch of
//! undecoded rows.
//!
//! ```text
//! CSV bytes → AsyncReader → Vec<RawRecord> batches
//!                  ↓
//!            format module
//!        (from_text_columns)
//! ```

use crate::io::format::from_text_columns;
use crate::types::RawRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Asynchronous CSV reader
///
/// Rows are read as text columns first, so identifiers such as `0042`
/// keep their leading zeros.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data with a header row
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of raw records
    ///
    /// Reads until `batch_size` records are decoded or the source ends.
    /// Rows that cannot be decoded are logged and skipped.
    ///
    /// # Returns
    ///
    /// The decoded records. An empty vector means the source is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<RawRecord> {
        let batch_size = batch_size.max(1);
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<HashMap<String, String>>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(Ok(columns)) => match from_text_columns::<RawRecord>(columns) {
                    Ok(record) => batch.push(record),
                    Err(e) => warn!(error = %e, "skipping unreadable record row"),
                },
                Some(Err(e)) => warn!(error = %e, "CSV parse error"),
                None => break,
            }
        }

        batch
    }

    /// Drain the remaining rows, `batch_size` at a time
    pub async fn read_to_end(&mut self, batch_size: usize) -> Vec<RawRecord> {
        let mut records = Vec::new();
        loop {
            let batch = self.read_batch(batch_size).await;
            if batch.is_empty() {
                break;
            }
            debug!(rows = batch.len(), "decoded record batch");
            records.extend(batch);
        }
        records
    }
}
