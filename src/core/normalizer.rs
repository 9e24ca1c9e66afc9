//! Record normalization
//!
//! Coerces the raw text fields of a [`RawRecord`] into typed values. Nothing
//! here can fail: absent or unparseable numbers become zero and unparseable
//! dates become the `None` sentinel, which orders before every valid date.

use crate::types::RawRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Accepted date-time layouts, tried in order after RFC 3339
///
/// `%.f` also matches a missing fractional part.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Typed values extracted from one raw record
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub sold_value: Decimal,
    pub bought_cost: Decimal,

    /// Parsed document date, `None` when missing or unparseable
    pub document_date: Option<NaiveDateTime>,

    /// Count of non-empty numeric fields that fell back to zero
    pub malformed_numbers: usize,
}

/// Normalize one raw record
///
/// Pure function: the record is only read. Degraded fields are logged at
/// debug level with the owning client and movement for diagnosis.
pub fn normalize(record: &RawRecord) -> NormalizedRecord {
    let mut malformed_numbers = 0;
    let mut amount = |field: &str, raw: &Option<String>| {
        let text = raw.as_deref();
        match parse_amount(text) {
            Some(value) => value,
            None => {
                if text.is_some_and(|t| !t.trim().is_empty()) {
                    malformed_numbers += 1;
                    debug!(
                        client = %record.client_id,
                        movement = %record.movement_id,
                        field,
                        value = text.unwrap_or_default(),
                        "unparseable number, using 0"
                    );
                }
                Decimal::ZERO
            }
        }
    };

    let quantity = amount("quantity", &record.quantity);
    let unit_price = amount("unit_price", &record.unit_price);
    let sold_value = amount("sold_value", &record.sold_value);
    let bought_cost = amount("bought_cost", &record.bought_cost);

    let document_date = parse_document_date(record.document_date.as_deref());
    if document_date.is_none() {
        debug!(
            client = %record.client_id,
            movement = %record.movement_id,
            value = record.document_date.as_deref().unwrap_or_default(),
            "unparseable document date, ignoring for recency"
        );
    }

    NormalizedRecord {
        quantity,
        unit_price,
        sold_value,
        bought_cost,
        document_date,
        malformed_numbers,
    }
}

/// Parse a numeric field
///
/// Accepts plain decimals, scientific notation, and a lone comma as the
/// decimal separator (`"141,6"`). Returns `None` for missing, blank or
/// unparseable input.
pub fn parse_amount(raw: Option<&str>) -> Option<Decimal> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(value) = Decimal::from_str(text) {
        return Some(value);
    }

    if !text.contains('.') && text.matches(',').count() == 1 {
        if let Ok(value) = Decimal::from_str(&text.replace(',', ".")) {
            return Some(value);
        }
    }

    Decimal::from_scientific(text).ok()
}

/// Parse a document date
///
/// Offsets in RFC 3339 input are converted to UTC; naive inputs are taken
/// as-is. A bare date is read as midnight.
pub fn parse_document_date(raw: Option<&str>) -> Option<NaiveDateTime> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Some(date_time.naive_utc());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
