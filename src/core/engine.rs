//! Aggregation engine
//!
//! This module provides the [`AggregationEngine`] that turns a flat sequence
//! of raw line-items into sorted, enriched client aggregates by running each
//! record through the pipeline:
//!
//! ```text
//! RawRecord → normalize → ClientAccumulator → MovementAccumulator
//!                                   ↓ (finish)
//!                             finalize → sort_by_recency → Aggregation
//! ```
//!
//! An engine holds only per-invocation state. Running two batches means
//! creating two engines; nothing is shared between them except the read-only
//! reference snapshot.

use crate::core::client_accumulator::ClientAccumulator;
use crate::core::finalizer::finalize;
use crate::core::normalizer::normalize;
use crate::core::sorter::sort_by_recency;
use crate::core::traits::ReferenceLookup;
use crate::types::{Aggregation, Client, Diagnostics, RawRecord};
use tracing::info;

/// Single-invocation aggregation engine
///
/// Feed records with [`ingest`](Self::ingest), then call
/// [`finish`](Self::finish) once to obtain the complete result. The engine
/// never fails on record content.
pub struct AggregationEngine<'a, L: ReferenceLookup + ?Sized> {
    references: &'a L,
    clients: ClientAccumulator,
    diagnostics: Diagnostics,
}

impl<'a, L: ReferenceLookup + ?Sized> AggregationEngine<'a, L> {
    /// Create an engine bound to a reference snapshot
    pub fn new(references: &'a L) -> Self {
        AggregationEngine {
            references,
            clients: ClientAccumulator::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Ingest one raw record
    pub fn ingest(&mut self, record: RawRecord) {
        let values = normalize(&record);

        self.diagnostics.records += 1;
        self.diagnostics.malformed_numbers += values.malformed_numbers;
        if values.document_date.is_none() {
            self.diagnostics.unparseable_dates += 1;
        }

        self.clients.accumulate(record, &values, self.references);
    }

    /// Ingest every record of a sequence, in order
    pub fn ingest_all<I: IntoIterator<Item = RawRecord>>(&mut self, records: I) {
        for record in records {
            self.ingest(record);
        }
    }

    /// Number of records ingested so far
    pub fn records_ingested(&self) -> usize {
        self.diagnostics.records
    }

    /// Finalize and sort, consuming the engine
    pub fn finish(self) -> Aggregation {
        let mut diagnostics = self.diagnostics;
        diagnostics.reference_misses = self.clients.reference_misses();
        diagnostics.revenue_overflows = self.clients.revenue_overflows();

        let mut clients = finalize(self.clients.into_builders());
        sort_by_recency(&mut clients);

        diagnostics.clients = clients.len();
        diagnostics.movements = clients.iter().map(|c| c.movements.len()).sum();

        info!(
            records = diagnostics.records,
            clients = diagnostics.clients,
            movements = diagnostics.movements,
            malformed_numbers = diagnostics.malformed_numbers,
            unparseable_dates = diagnostics.unparseable_dates,
            reference_misses = diagnostics.reference_misses,
            revenue_overflows = diagnostics.revenue_overflows,
            "aggregation complete"
        );

        Aggregation {
            clients,
            diagnostics,
        }
    }
}

impl<L: ReferenceLookup + ?Sized> std::fmt::Debug for AggregationEngine<'_, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationEngine")
            .field("clients", &self.clients.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

/// Aggregate a complete batch in one call
///
/// Pure function of its two inputs: identical inputs yield identical output,
/// ordering included.
pub fn aggregate<I, L>(records: I, references: &L) -> Vec<Client>
where
    I: IntoIterator<Item = RawRecord>,
    L: ReferenceLookup + ?Sized,
{
    aggregate_with_diagnostics(records, references).clients
}

/// Aggregate a complete batch, keeping the diagnostics counters
pub fn aggregate_with_diagnostics<I, L>(records: I, references: &L) -> Aggregation
where
    I: IntoIterator<Item = RawRecord>,
    L: ReferenceLookup + ?Sized,
{
    let mut engine = AggregationEngine::new(references);
    engine.ingest_all(records);
    engine.finish()
}

/// Keep only the clients served by one agent, preserving order
pub fn filter_by_agent(clients: Vec<Client>, agent_id: &str) -> Vec<Client> {
    clients
        .into_iter()
        .filter(|client| client.agent == agent_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientReference, ReferenceTable};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn row(client: &str, movement: &str, date: &str, sold: &str) -> RawRecord {
        RawRecord {
            client_id: client.to_string(),
            client_name: format!("Client {}", client),
            agent_id: "11".to_string(),
            movement_id: movement.to_string(),
            article_id: format!("ART-{}-{}", movement, sold),
            article_name: "Article".to_string(),
            article_brand: "Brand".to_string(),
            quantity: Some("1".to_string()),
            unit_price: Some(sold.to_string()),
            sold_value: Some(sold.to_string()),
            bought_cost: Some("1.00".to_string()),
            document_date: Some(date.to_string()),
            discount_category: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let records = vec![
            row("C1", "M1", "2024-03-01", "10.00"),
            row("C1", "M1", "2024-03-05", "5.00"),
            row("C1", "M2", "2024-02-01", "7.00"),
        ];

        let clients = aggregate(records, &ReferenceTable::new());

        assert_eq!(clients.len(), 1);
        let c1 = &clients[0];
        assert_eq!(c1.id, "C1");
        assert_eq!(c1.total_orders, 2);
        assert_eq!(format!("{:.2}", c1.total_revenue), "22.00");

        assert_eq!(c1.movements[0].id, "M1");
        assert_eq!(c1.movements[0].order_date, day(2024, 3, 5));
        assert_eq!(c1.movements[0].details.len(), 2);
        assert_eq!(c1.movements[1].id, "M2");
        assert_eq!(c1.movements[1].order_date, day(2024, 2, 1));
        assert_eq!(c1.movements[1].details.len(), 1);
    }

    #[test]
    fn test_movement_date_is_maximum_of_out_of_order_rows() {
        // t2 < t3 < t1, fed as [t2, t3, t1]
        let records = vec![
            row("C1", "M1", "2024-01-02", "1"),
            row("C1", "M1", "2024-01-03", "1"),
            row("C1", "M1", "2024-01-09", "1"),
        ];

        let clients = aggregate(records, &ReferenceTable::new());
        assert_eq!(clients[0].movements[0].order_date, day(2024, 1, 9));
    }

    #[test]
    fn test_malformed_date_does_not_win() {
        let records = vec![
            row("C1", "M1", "2024-01-02", "1"),
            row("C1", "M1", "not-a-date", "1"),
            row("C1", "M1", "2024-01-05", "1"),
        ];

        let aggregation = aggregate_with_diagnostics(records, &ReferenceTable::new());
        let movement = &aggregation.clients[0].movements[0];
        assert_eq!(movement.order_date, day(2024, 1, 5));
        assert_eq!(movement.details.len(), 3);
        assert_eq!(aggregation.diagnostics.unparseable_dates, 1);
    }

    #[test]
    fn test_sort_stability_for_equal_latest_dates() {
        let records = vec![
            row("A", "M1", "2024-01-10", "1"),
            row("B", "M1", "2024-01-10", "1"),
            row("C", "M1", "2024-01-01", "1"),
        ];

        let clients = aggregate(records, &ReferenceTable::new());
        let ids: Vec<&str> = clients.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_sort_stability_ignores_time_of_day() {
        let records = vec![
            row("A", "M1", "2024-01-10T00:00:00", "1"),
            row("B", "M1", "2024-01-10T15:00:00", "1"),
        ];

        let clients = aggregate(records, &ReferenceTable::new());
        let ids: Vec<&str> = clients.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_revenue_overflow_saturates_without_panicking() {
        let records = vec![
            row("C1", "M1", "2024-01-10", "79228162514264337593543950335"),
            row("C1", "M1", "2024-01-11", "79228162514264337593543950335"),
            row("C2", "M1", "2024-01-01", "2"),
        ];

        let aggregation = aggregate_with_diagnostics(records, &ReferenceTable::new());

        assert_eq!(aggregation.clients.len(), 2);
        assert_eq!(aggregation.clients[0].id, "C1");
        assert_eq!(aggregation.clients[0].total_revenue, Decimal::MAX);
        assert_eq!(aggregation.clients[0].movements[0].details.len(), 2);
        assert_eq!(aggregation.clients[1].total_revenue, dec("2.00"));
        assert_eq!(aggregation.diagnostics.revenue_overflows, 1);
    }

    #[test]
    fn test_blank_discount_category_on_first_row_is_skipped() {
        let mut first = row("C1", "M1", "2024-01-10", "1");
        first.discount_category = Some(String::new());
        let mut second = row("C1", "M1", "2024-01-10", "2");
        second.discount_category = Some("PN".to_string());

        let clients = aggregate(vec![first, second], &ReferenceTable::new());
        assert_eq!(clients[0].movements[0].discount_category, "PN");
    }

    #[test]
    fn test_clients_sorted_by_recency() {
        let records = vec![
            row("OLD", "M1", "2023-06-01", "1"),
            row("NEW", "M1", "2023-01-01", "1"),
            row("NEW", "M2", "2024-06-01", "1"),
        ];

        let clients = aggregate(records, &ReferenceTable::new());
        let ids: Vec<&str> = clients.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["NEW", "OLD"]);
    }

    #[test]
    fn test_missing_reference_degrades_to_empty_fields() {
        let references: ReferenceTable = std::iter::once(ClientReference {
            code: "KNOWN".to_string(),
            address: Some("VIA ROMA 1".to_string()),
            phone: Some("095 123456".to_string()),
            tax_code: Some("01234567890".to_string()),
            ..Default::default()
        })
        .collect();
        let records = vec![
            row("KNOWN", "M1", "2024-01-01", "4.00"),
            row("UNKNOWN", "M1", "2024-01-01", "3.50"),
        ];

        let aggregation = aggregate_with_diagnostics(records, &references);
        let unknown = aggregation
            .clients
            .iter()
            .find(|c| c.id == "UNKNOWN")
            .unwrap();

        assert_eq!(unknown.name, "Client UNKNOWN");
        assert_eq!(unknown.total_revenue, dec("3.50"));
        assert!(unknown.address.is_empty());
        assert!(unknown.phone.is_empty());
        assert!(unknown.tax_code.is_empty());
        assert!(unknown.extended_tax_code.is_empty());

        let known = aggregation.clients.iter().find(|c| c.id == "KNOWN").unwrap();
        assert_eq!(known.address, "VIA ROMA 1");
        assert_eq!(aggregation.diagnostics.reference_misses, 1);
    }

    #[test]
    fn test_movement_ids_scoped_per_client() {
        let records = vec![
            row("C1", "M1", "2024-01-01", "1"),
            row("C2", "M1", "2024-01-01", "2"),
        ];

        let clients = aggregate(records, &ReferenceTable::new());
        assert_eq!(clients.len(), 2);
        assert!(clients.iter().all(|c| c.total_orders == 1));
        assert!(clients.iter().all(|c| c.movements[0].details.len() == 1));
    }

    #[test]
    fn test_totals_invariants_hold() {
        let records = vec![
            row("C1", "M1", "2024-01-01", "1.111"),
            row("C2", "M7", "2024-01-02", "2.005"),
            row("C1", "M2", "2024-01-03", "3.499"),
            row("C1", "M1", "bad", "0.004"),
            row("C3", "M1", "2024-01-01", "x"),
            row("C2", "M7", "2024-01-04", "9"),
            row("C2", "M8", "2024-01-05", "0.5"),
        ];
        let distinct_pairs: HashSet<(String, String)> = records
            .iter()
            .map(|r| (r.client_id.clone(), r.movement_id.clone()))
            .collect();

        let clients = aggregate(records, &ReferenceTable::new());

        let total_orders: usize = clients.iter().map(|c| c.total_orders).sum();
        assert_eq!(total_orders, distinct_pairs.len());

        for client in &clients {
            assert_eq!(client.total_orders, client.movements.len());
            let detail_sum: Decimal = client
                .movements
                .iter()
                .flat_map(|m| m.details.iter())
                .map(|d| d.price_sold)
                .sum();
            assert_eq!(client.total_revenue, detail_sum.round_dp(2));
        }
    }

    #[test]
    fn test_idempotent_output() {
        let records = vec![
            row("C2", "M1", "2024-01-10", "1"),
            row("C1", "M1", "2024-01-10", "2"),
            row("C1", "M2", "garbage", "3"),
            row("C3", "M9", "2024-02-10", "4"),
        ];
        let references = ReferenceTable::new();

        let first = serde_json::to_string(&aggregate(records.clone(), &references)).unwrap();
        let second = serde_json::to_string(&aggregate(records, &references)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let aggregation = aggregate_with_diagnostics(Vec::new(), &ReferenceTable::new());
        assert!(aggregation.clients.is_empty());
        assert_eq!(aggregation.diagnostics, Diagnostics::default());
    }

    #[test]
    fn test_diagnostics_counts() {
        let mut bad = row("C1", "M1", "2024-01-01", "oops");
        bad.quantity = Some("many".to_string());

        let references = ReferenceTable::new();
        let mut engine = AggregationEngine::new(&references);
        engine.ingest(row("C1", "M1", "2024-01-01", "1"));
        engine.ingest(bad);
        engine.ingest(row("C2", "M1", "", "1"));
        assert_eq!(engine.records_ingested(), 3);

        let diagnostics = engine.finish().diagnostics;
        // "oops" appears in both unit price and sold value
        assert_eq!(diagnostics.malformed_numbers, 3);
        assert_eq!(diagnostics.unparseable_dates, 1);
        assert_eq!(diagnostics.reference_misses, 2);
        assert_eq!(diagnostics.clients, 2);
        assert_eq!(diagnostics.movements, 2);
    }

    #[test]
    fn test_filter_by_agent() {
        let mut other = row("C2", "M1", "2024-05-01", "1");
        other.agent_id = "90".to_string();
        let records = vec![
            row("C1", "M1", "2024-01-01", "1"),
            other,
            row("C3", "M1", "2024-03-01", "1"),
        ];

        let clients = filter_by_agent(aggregate(records, &ReferenceTable::new()), "11");
        let ids: Vec<&str> = clients.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C3", "C1"]);
    }
}
