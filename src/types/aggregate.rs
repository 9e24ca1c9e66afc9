//! Aggregated output types
//!
//! The engine turns flat line-items into a Client → Movement → Detail
//! hierarchy. These types are the output shape consumed by the dashboard and
//! serialize with its camelCase field names.
//!
//! # Number rendering
//!
//! Money and quantity values are stored as [`Decimal`] rounded to 2 places
//! (half away from zero) and serialized as fixed 2-decimal strings, e.g.
//! `"141.60"`.

use super::record::{ClientId, MovementId};
use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

/// Round a value to the 2-decimal output precision
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One article line of a movement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    pub article_id: String,
    pub name: String,
    pub brand: String,
    #[serde(serialize_with = "fixed2")]
    pub quantity: Decimal,
    #[serde(serialize_with = "fixed2")]
    pub unit_price: Decimal,
    #[serde(serialize_with = "fixed2")]
    pub price_sold: Decimal,
    #[serde(serialize_with = "fixed2")]
    pub price_bought: Decimal,
}

impl Detail {
    /// Create a detail line, rounding every numeric field to 2 decimals
    pub fn new(
        article_id: String,
        name: String,
        brand: String,
        quantity: Decimal,
        unit_price: Decimal,
        price_sold: Decimal,
        price_bought: Decimal,
    ) -> Self {
        Detail {
            article_id,
            name,
            brand,
            quantity: round_money(quantity),
            unit_price: round_money(unit_price),
            price_sold: round_money(price_sold),
            price_bought: round_money(price_bought),
        }
    }
}

/// One order of a client, grouping its article lines
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    /// Order identifier, unique within the owning client only
    pub id: MovementId,

    /// First non-empty discount category among the order's lines
    pub discount_category: String,

    /// Article lines in first-seen order
    pub details: Vec<Detail>,

    /// Not computed by the engine, always empty
    pub unpaid_amount: String,

    /// Not computed by the engine, always empty
    pub payment_due_date: String,

    /// Latest document date among the order's lines
    ///
    /// `None` when no line carried a parseable date. Serialized as
    /// `YYYY-MM-DD`, or `""` when absent.
    #[serde(rename = "dateOfOrder", serialize_with = "order_date")]
    pub order_date: Option<NaiveDateTime>,
}

/// Aggregated client with its orders and totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,

    /// Display name from the first line seen for this client
    pub name: String,

    pub extended_name: String,
    pub province: String,
    pub phone: String,

    /// Number of distinct movements, always equal to `movements.len()`
    pub total_orders: usize,

    /// Sum of every detail's sold value
    #[serde(serialize_with = "fixed2")]
    pub total_revenue: Decimal,

    /// Not computed by the engine, always empty
    pub unpaid_revenue: String,

    pub address: String,
    pub email: String,
    pub pec: String,
    pub tax_code: String,
    pub extended_tax_code: String,
    pub payment_method_id: String,
    pub payment_method: String,

    /// Agent identifier from the first line seen for this client
    pub agent: String,

    /// Movements in first-seen order
    pub movements: Vec<Movement>,
}

impl Client {
    /// Latest order date across all of the client's movements
    ///
    /// Returns `None` when the client has no movement with a valid date,
    /// which orders before every dated client.
    pub fn latest_order_date(&self) -> Option<NaiveDateTime> {
        self.movements
            .iter()
            .filter_map(|movement| movement.order_date)
            .max()
    }
}

/// Clients served by one agent
///
/// Produced from the recency-sorted client list, so `clients` is itself in
/// recency order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    /// Display label, `Agent <id>`
    pub name: String,
    pub clients: Vec<Client>,
}

impl Agent {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Agent {
            name: format!("Agent {}", id),
            id,
            clients: Vec::new(),
        }
    }

    /// Number of orders across all of the agent's clients
    pub fn total_orders(&self) -> usize {
        self.clients.iter().map(|client| client.total_orders).sum()
    }
}

/// Per-invocation counters describing how much input was degraded
///
/// Purely informational: none of these affect the client output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Records ingested
    pub records: usize,
    /// Non-empty numeric fields that could not be parsed and became zero
    pub malformed_numbers: usize,
    /// Records whose document date was missing or unparseable
    pub unparseable_dates: usize,
    /// Distinct clients with no reference entry
    pub reference_misses: usize,
    /// Lines whose sold value pushed a client's revenue out of range
    pub revenue_overflows: usize,
    /// Clients produced
    pub clients: usize,
    /// Movements produced, across all clients
    pub movements: usize,
}

/// Complete result of one engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Clients sorted by latest order date, most recent first
    pub clients: Vec<Client>,
    pub diagnostics: Diagnostics,
}

fn fixed2<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:.2}", value))
}

fn order_date<S: Serializer>(
    value: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(date_time) => serializer.collect_str(&date_time.format("%Y-%m-%d")),
        None => serializer.serialize_str(""),
    }
}
