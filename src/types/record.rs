//! Raw transaction line-item types
//!
//! A [`RawRecord`] is one article line inside one order, exactly as exported by
//! the upstream sales system. Every numeric and date field is kept as raw text;
//! interpretation is deferred to the normalizer so that a single bad cell never
//! prevents the record from being grouped.

use serde::Deserialize;

/// Client identifier (`Codice Cliente`)
pub type ClientId = String;

/// Movement (order) identifier (`Numero Lista`)
///
/// Only unique within the scope of a single client.
pub type MovementId = String;

/// Input transaction line-item
///
/// Field names follow the export's native column headers, with snake_case
/// aliases for hand-written inputs. Unknown columns (`Mese`, `Anno`, ...) are
/// ignored and missing columns default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    /// Client identifier
    #[serde(rename = "Codice Cliente", alias = "client_id", deserialize_with = "lenient::text")]
    pub client_id: ClientId,

    /// Client display name
    #[serde(
        rename = "Ragione Sociale Cliente",
        alias = "client_name",
        deserialize_with = "lenient::text"
    )]
    pub client_name: String,

    /// Agent identifier
    #[serde(rename = "Codice Agente", alias = "agent_id", deserialize_with = "lenient::text")]
    pub agent_id: String,

    /// Movement (order) identifier
    #[serde(rename = "Numero Lista", alias = "movement_id", deserialize_with = "lenient::text")]
    pub movement_id: MovementId,

    /// Article identifier
    #[serde(rename = "Codice Articolo", alias = "article_id", deserialize_with = "lenient::text")]
    pub article_id: String,

    /// Article description
    #[serde(
        rename = "Descrizione Articolo",
        alias = "article_name",
        deserialize_with = "lenient::text"
    )]
    pub article_name: String,

    /// Article brand
    #[serde(rename = "Marca Articolo", alias = "article_brand", deserialize_with = "lenient::text")]
    pub article_brand: String,

    /// Sales discount category, shared by every line of an order when present
    #[serde(
        rename = "Categoria Sconto Vendita",
        alias = "discount_category",
        deserialize_with = "lenient::optional_text"
    )]
    pub discount_category: Option<String>,

    #[serde(rename = "Quantita", alias = "quantity", deserialize_with = "lenient::optional_text")]
    pub quantity: Option<String>,

    #[serde(
        rename = "Prezzo Articolo",
        alias = "unit_price",
        deserialize_with = "lenient::optional_text"
    )]
    pub unit_price: Option<String>,

    #[serde(rename = "Valore", alias = "sold_value", deserialize_with = "lenient::optional_text")]
    pub sold_value: Option<String>,

    #[serde(rename = "Costo", alias = "bought_cost", deserialize_with = "lenient::optional_text")]
    pub bought_cost: Option<String>,

    /// Document date, ISO-like but not guaranteed to parse
    #[serde(
        rename = "Data Documento Precedente",
        alias = "document_date",
        deserialize_with = "lenient::optional_text"
    )]
    pub document_date: Option<String>,
}

/// Scalar-to-text deserializers shared by the input types
///
/// Exports mix numbers and strings for the same column (`2709` vs `"2709"`,
/// `11.0` for an agent code), so every field accepts any scalar and keeps its
/// textual form. Integral floats render without the fractional part.
pub(crate) mod lenient {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number, boolean or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(render_float(v)))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(TextVisitor)
        }
    }

    fn render_float(v: f64) -> String {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
            format!("{}", v as i64)
        } else {
            v.to_string()
        }
    }

    /// Identifier / display text: trimmed, null becomes empty
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = deserializer.deserialize_any(TextVisitor)?;
        Ok(value.map(|s| s.trim().to_string()).unwrap_or_default())
    }

    /// Optional text: blank and null both become `None`
    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = deserializer.deserialize_any(TextVisitor)?;
        Ok(value.filter(|s| !s.trim().is_empty()))
    }
}
