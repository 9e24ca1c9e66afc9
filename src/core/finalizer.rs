//! Aggregate finalization
//!
//! Projects the accumulator's working structures into the output shape. No
//! grouping happens here: movements keep their first-seen order (they are not
//! re-sorted by date), revenue is rounded to 2 decimals and the enrichment
//! fields are flattened to strings.

use crate::core::client_accumulator::ClientBuilder;
use crate::types::aggregate::round_money;
use crate::types::Client;

/// Finalize every client builder, preserving order
pub fn finalize(builders: Vec<ClientBuilder>) -> Vec<Client> {
    builders.into_iter().map(finalize_client).collect()
}

/// Finalize a single client
pub fn finalize_client(builder: ClientBuilder) -> Client {
    let ClientBuilder {
        id,
        name,
        agent,
        reference,
        movements,
        total_orders,
        revenue,
    } = builder;

    let movements = movements.into_movements();
    debug_assert_eq!(total_orders, movements.len());

    Client {
        id,
        name,
        extended_name: reference.extended_name.unwrap_or_default(),
        province: reference.province.unwrap_or_default(),
        phone: reference.phone.unwrap_or_default(),
        total_orders,
        total_revenue: round_money(revenue),
        unpaid_revenue: String::new(),
        address: reference.address.unwrap_or_default(),
        email: reference.email.unwrap_or_default(),
        pec: reference.pec.unwrap_or_default(),
        tax_code: reference.tax_code.unwrap_or_default(),
        extended_tax_code: reference.extended_tax_code.unwrap_or_default(),
        payment_method_id: reference.payment_method_id.unwrap_or_default(),
        payment_method: reference.payment_method.unwrap_or_default(),
        agent,
        movements,
    }
}
