//! Client reference data
//!
//! The reference table is an external snapshot of per-client registry data
//! (address, contacts, tax codes, payment terms). The engine only performs
//! point lookups against it and never mutates it.

use super::record::{lenient, ClientId};
use serde::Deserialize;
use std::collections::HashMap;

/// Registry entry for one known client
///
/// All enrichment fields are optional; a missing field renders as an empty
/// string in the aggregated output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientReference {
    #[serde(rename = "CODICE", alias = "code", deserialize_with = "lenient::text")]
    pub code: ClientId,

    #[serde(
        rename = "RAGIONE SOCIALE AGG.",
        alias = "extended_name",
        deserialize_with = "lenient::optional_text"
    )]
    pub extended_name: Option<String>,

    #[serde(rename = "INDIRIZZO", alias = "address", deserialize_with = "lenient::optional_text")]
    pub address: Option<String>,

    /// Postal code, town and province in a single field
    #[serde(
        rename = "C.A.P. - COMUNE (PROV.)",
        alias = "province",
        deserialize_with = "lenient::optional_text"
    )]
    pub province: Option<String>,

    #[serde(rename = "TELEFONO", alias = "phone", deserialize_with = "lenient::optional_text")]
    pub phone: Option<String>,

    #[serde(rename = "EMAIL", alias = "email", deserialize_with = "lenient::optional_text")]
    pub email: Option<String>,

    /// Certified e-mail address
    #[serde(rename = "EMAIL PEC", alias = "pec", deserialize_with = "lenient::optional_text")]
    pub pec: Option<String>,

    /// VAT number
    #[serde(rename = "PARTITA IVA", alias = "tax_code", deserialize_with = "lenient::optional_text")]
    pub tax_code: Option<String>,

    /// Fiscal code
    #[serde(
        rename = "CODICE FISCALE",
        alias = "extended_tax_code",
        deserialize_with = "lenient::optional_text"
    )]
    pub extended_tax_code: Option<String>,

    #[serde(rename = "MP", alias = "payment_method_id", deserialize_with = "lenient::optional_text")]
    pub payment_method_id: Option<String>,

    // The export header is misspelled upstream.
    #[serde(
        rename = "Descizione metodo pagamento",
        alias = "payment_method",
        deserialize_with = "lenient::optional_text"
    )]
    pub payment_method: Option<String>,
}

/// Immutable snapshot of client reference data keyed by client identifier
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: HashMap<ClientId, ClientReference>,
}

impl ReferenceTable {
    /// Create an empty table
    ///
    /// Every lookup against an empty table misses, which is a valid input:
    /// clients are still aggregated, just without enrichment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct clients in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a client's reference entry
    pub fn get(&self, client_id: &str) -> Option<&ClientReference> {
        self.entries.get(client_id)
    }
}

impl FromIterator<ClientReference> for ReferenceTable {
    /// Build a table keyed by each entry's `code`
    ///
    /// Later entries with the same code replace earlier ones, matching a
    /// map built from the registry export row by row.
    fn from_iter<I: IntoIterator<Item = ClientReference>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|reference| (reference.code.clone(), reference))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_registry_row() {
        let json = r#"{
            "CODICE": 2709,
            "RAGIONE SOCIALE AGG.": "S.E.A. SERVIZI ECOLOGICI SRL",
            "INDIRIZZO": "VIA ROMA 1",
            "C.A.P. - COMUNE (PROV.)": "95100 - CATANIA (CT)",
            "TELEFONO": "095 123456",
            "EMAIL": "info@sea.example",
            "EMAIL PEC": null,
            "PARTITA IVA": "01234567890",
            "MP": "RB60",
            "Descizione metodo pagamento": "RIBA 60 GG"
        }"#;

        let reference: ClientReference = serde_json::from_str(json).unwrap();
        assert_eq!(reference.code, "2709");
        assert_eq!(reference.address.as_deref(), Some("VIA ROMA 1"));
        assert_eq!(reference.pec, None);
        assert_eq!(reference.extended_tax_code, None);
        assert_eq!(reference.payment_method.as_deref(), Some("RIBA 60 GG"));
    }

    #[test]
    fn test_table_lookup_by_code() {
        let table: ReferenceTable = vec![
            ClientReference {
                code: "C1".to_string(),
                phone: Some("111".to_string()),
                ..Default::default()
            },
            ClientReference {
                code: "C2".to_string(),
                ..Default::default()
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("C1").and_then(|r| r.phone.as_deref()), Some("111"));
        assert!(table.get("C3").is_none());
    }

    #[test]
    fn test_table_later_duplicate_wins() {
        let table: ReferenceTable = vec![
            ClientReference {
                code: "C1".to_string(),
                email: Some("old@example.com".to_string()),
                ..Default::default()
            },
            ClientReference {
                code: "C1".to_string(),
                email: Some("new@example.com".to_string()),
                ..Default::default()
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("C1").and_then(|r| r.email.as_deref()),
            Some("new@example.com")
        );
    }

    #[test]
    fn test_empty_table() {
        let table = ReferenceTable::new();
        assert!(table.is_empty());
        assert!(table.get("C1").is_none());
    }
}
