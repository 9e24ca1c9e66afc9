//! Recency ordering
//!
//! The only whole-batch step: clients are ordered by their latest movement
//! date, most recent first. Order dates are compared by calendar day, the
//! granularity they are reported at, so the time of day never reorders
//! clients. The sort is stable: clients with the same latest day keep their
//! first-seen order. Clients without any dated movement sort last.

use crate::types::Client;
use std::cmp::Reverse;

/// Sort clients by latest order date, descending and stable
pub fn sort_by_recency(clients: &mut [Client]) {
    // Cached-key sort is stable and computes each client's key once.
    clients.sort_by_cached_key(|client| {
        Reverse(client.latest_order_date().map(|date_time| date_time.date()))
    });
}
