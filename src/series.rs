//! Core data model: raw provider payloads and normalized price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw daily series for one symbol, exactly as the price provider returned it.
///
/// The daily map is kept in provider order (most recent date first); the
/// normalizer relies on that order when it reverses the series. `serde_json`
/// runs with `preserve_order` so round-tripping through the cache file keeps
/// it intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSeries {
    #[serde(
        rename = "Meta Data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub meta: Option<Value>,
    #[serde(rename = "Time Series (Daily)", default)]
    pub days: serde_json::Map<String, Value>,
}

impl RawSeries {
    /// Extracts the closing price of one daily bar. The provider encodes
    /// numeric fields as strings (`"4. close": "185.6400"`).
    pub fn close_of(bar: &Value) -> Option<f64> {
        match bar.get("4. close")? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

/// The full price cache payload: one raw series per tracked symbol plus the
/// fetch timestamp. Persisted and replaced as a whole, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePayload {
    pub last_modified: i64,
    pub readable_last_modified: String,
    #[serde(flatten)]
    pub series: BTreeMap<String, RawSeries>,
}

/// One currency-converted closing price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Close in the target currency, rounded to 2 decimal places.
    pub close: f64,
    pub symbol: String,
}

impl std::fmt::Display for PricePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} closed at {:.2} on {}", self.symbol, self.close, self.date)
    }
}

/// Symbol -> points in strictly ascending date order. A plain mapping so any
/// rendering layer can consume it without knowing the pipeline's internals.
pub type NormalizedSeries = BTreeMap<String, Vec<PricePoint>>;
