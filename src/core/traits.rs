//! Core traits
//!
//! The reference table is an external collaborator: the engine only needs
//! point lookups by client identifier, so it depends on this trait rather
//! than on a concrete store.

use crate::types::{ClientReference, ReferenceTable};
use std::collections::HashMap;

/// Read-only point lookup of client reference data
///
/// Implementations must behave as an immutable snapshot for the duration of
/// an engine invocation. A miss is a normal outcome, not an error.
pub trait ReferenceLookup {
    /// Find the reference entry for a client
    fn lookup(&self, client_id: &str) -> Option<&ClientReference>;
}

impl ReferenceLookup for ReferenceTable {
    fn lookup(&self, client_id: &str) -> Option<&ClientReference> {
        self.get(client_id)
    }
}

impl ReferenceLookup for HashMap<String, ClientReference> {
    fn lookup(&self, client_id: &str) -> Option<&ClientReference> {
        self.get(client_id)
    }
}
