//! Client grouping
//!
//! The [`ClientAccumulator`] keys in-progress clients by client identifier.
//! A client is created the first time its identifier appears: its display
//! name and agent come from that first line and its enrichment fields from a
//! single reference lookup. Every line then lands in the client's nested
//! [`MovementAccumulator`] and adds its sold value to the running revenue.

use crate::core::movement_accumulator::MovementAccumulator;
use crate::core::normalizer::NormalizedRecord;
use crate::core::traits::ReferenceLookup;
use crate::types::{ClientId, ClientReference, Detail, RawRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

/// In-progress client aggregate
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    pub(crate) id: ClientId,
    pub(crate) name: String,
    pub(crate) agent: String,
    /// Reference entry found on first sight, default when the lookup missed
    pub(crate) reference: ClientReference,
    pub(crate) movements: MovementAccumulator,
    /// Incremented once per distinct movement
    pub(crate) total_orders: usize,
    /// Unrounded running sum of detail sold values
    pub(crate) revenue: Decimal,
}

impl ClientBuilder {
    fn new(record: &RawRecord, reference: Option<&ClientReference>) -> Self {
        ClientBuilder {
            id: record.client_id.clone(),
            name: record.client_name.clone(),
            agent: record.agent_id.clone(),
            reference: reference.cloned().unwrap_or_default(),
            movements: MovementAccumulator::new(),
            total_orders: 0,
            revenue: Decimal::ZERO,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn total_orders(&self) -> usize {
        self.total_orders
    }

    pub fn revenue(&self) -> Decimal {
        self.revenue
    }

    pub fn movements(&self) -> &MovementAccumulator {
        &self.movements
    }
}

/// Clients keyed by identifier, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ClientAccumulator {
    index: HashMap<ClientId, usize>,
    clients: Vec<ClientBuilder>,
    reference_misses: usize,
    revenue_overflows: usize,
}

impl ClientAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one normalized record into its client
    ///
    /// Creates the client (and performs its reference lookup) on first
    /// sight, then routes the line to the client's movement accumulator.
    pub fn accumulate<L>(&mut self, record: RawRecord, values: &NormalizedRecord, references: &L)
    where
        L: ReferenceLookup + ?Sized,
    {
        let position = match self.index.get(record.client_id.as_str()) {
            Some(&position) => position,
            None => {
                let reference = references.lookup(&record.client_id);
                if reference.is_none() {
                    self.reference_misses += 1;
                    debug!(client = %record.client_id, "no reference entry for client");
                }

                let position = self.clients.len();
                self.index.insert(record.client_id.clone(), position);
                self.clients.push(ClientBuilder::new(&record, reference));
                position
            }
        };

        let client = &mut self.clients[position];
        let RawRecord {
            movement_id,
            article_id,
            article_name,
            article_brand,
            discount_category,
            ..
        } = record;

        let detail = Detail::new(
            article_id,
            article_name,
            article_brand,
            values.quantity,
            values.unit_price,
            values.sold_value,
            values.bought_cost,
        );
        // Sum the rounded per-line value so the total matches its details.
        client.revenue = match client.revenue.checked_add(detail.price_sold) {
            Some(total) => total,
            None => {
                self.revenue_overflows += 1;
                warn!(
                    client = %client.id,
                    movement = %movement_id,
                    value = %detail.price_sold,
                    "revenue out of range, saturating"
                );
                if detail.price_sold.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                }
            }
        };

        if client.movements.accumulate(
            &movement_id,
            detail,
            values.document_date,
            discount_category.as_deref(),
        ) {
            client.total_orders += 1;
        }
    }

    /// Look up an in-progress client
    pub fn get(&self, client_id: &str) -> Option<&ClientBuilder> {
        self.index
            .get(client_id)
            .map(|&position| &self.clients[position])
    }

    /// Number of distinct clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Distinct clients whose reference lookup missed
    pub fn reference_misses(&self) -> usize {
        self.reference_misses
    }

    /// Lines whose sold value pushed a client's revenue out of range
    pub fn revenue_overflows(&self) -> usize {
        self.revenue_overflows
    }

    /// Hand over the builders in first-seen order
    pub fn into_builders(self) -> Vec<ClientBuilder> {
        self.clients
    }
}
