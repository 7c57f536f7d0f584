//! Upstream data providers.

pub mod alpha_vantage;
pub mod open_er;

pub use alpha_vantage::AlphaVantageProvider;
pub use open_er::OpenErApiProvider;

use crate::error::Result;
use crate::series::RawSeries;
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of full daily price history for a single symbol.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_daily_history(&self, symbol: &str) -> Result<RawSeries>;
}

/// Source of live exchange rates for a base currency.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    /// Returns the full quote-currency -> rate map for `base`.
    async fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>>;
}
