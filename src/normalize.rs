//! Turns raw provider payloads into ordered, currency-converted series.

use crate::cache::FxRateCache;
use crate::error::{Error, Result};
use crate::series::{NormalizedSeries, PricePayload, PricePoint, RawSeries};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Rounds to 2 decimal places, ties away from zero (`f64::round` semantics).
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts raw per-symbol daily records into [`NormalizedSeries`], applying
/// the cached exchange rate to every close.
pub struct Normalizer {
    fx: FxRateCache,
    base_currency: String,
    target_currency: String,
}

impl Normalizer {
    pub fn new(fx: FxRateCache, base_currency: &str, target_currency: &str) -> Self {
        Self {
            fx,
            base_currency: base_currency.to_string(),
            target_currency: target_currency.to_string(),
        }
    }

    /// Each point is computed independently as `round(close * rate, 2)`, so
    /// the output is deterministic for a given payload and rate. The raw
    /// daily maps arrive most-recent-first and are reversed exactly once
    /// into ascending date order.
    pub async fn normalize(&self, payload: &PricePayload) -> Result<NormalizedSeries> {
        let rate = self
            .fx
            .get_rate(&self.base_currency, &self.target_currency)
            .await?;
        debug!(
            "Converting closes {} -> {} at rate {rate}",
            self.base_currency, self.target_currency
        );

        let mut normalized = BTreeMap::new();
        for (symbol, raw) in &payload.series {
            let mut points = Vec::with_capacity(raw.days.len());
            for (date_str, bar) in &raw.days {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                    Error::MalformedPayload {
                        provider: "Alpha Vantage",
                        detail: format!("bad date {date_str:?} for {symbol}: {e}"),
                    }
                })?;
                let close = RawSeries::close_of(bar).ok_or_else(|| Error::MalformedPayload {
                    provider: "Alpha Vantage",
                    detail: format!("missing close for {symbol} on {date_str}"),
                })?;
                if close < 0.0 {
                    return Err(Error::MalformedPayload {
                        provider: "Alpha Vantage",
                        detail: format!("negative close {close} for {symbol} on {date_str}"),
                    });
                }
                points.push(PricePoint {
                    date,
                    close: round_to_cents(close * rate),
                    symbol: symbol.clone(),
                });
            }
            points.reverse();
            normalized.insert(symbol.clone(), points);
        }
        Ok(normalized)
    }
}
