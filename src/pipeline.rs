//! The end-to-end acquisition pipeline: load or fetch raw prices, then
//! normalize them into the target currency.

use crate::cache::PriceSeriesCache;
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::series::NormalizedSeries;
use tracing::debug;

/// Linear pipeline, re-run in full on every invocation. Repeated runs inside
/// the TTL window are served from the two disk caches, so callers can re-run
/// freely without paying network cost.
pub struct Pipeline {
    prices: PriceSeriesCache,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(prices: PriceSeriesCache, normalizer: Normalizer) -> Self {
        Self { prices, normalizer }
    }

    pub async fn run(&self) -> Result<NormalizedSeries> {
        let payload = self.prices.load_or_fetch().await?;
        debug!("Loaded payload covering {} symbols", payload.series.len());
        self.normalizer.normalize(&payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FxRateCache;
    use crate::error::Result;
    use crate::providers::{FxRateProvider, PriceHistoryProvider};
    use crate::series::RawSeries;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHistoryProvider {
        call_count: AtomicUsize,
    }

    #[async_trait]
    impl PriceHistoryProvider for CountingHistoryProvider {
        async fn fetch_daily_history(&self, _symbol: &str) -> Result<RawSeries> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_value(json!({
                "Time Series (Daily)": {
                    "2024-01-02": {"4. close": "100.00"},
                    "2024-01-01": {"4. close": "99.00"}
                }
            }))
            .unwrap())
        }
    }

    struct CountingFxProvider {
        call_count: AtomicUsize,
    }

    #[async_trait]
    impl FxRateProvider for CountingFxProvider {
        async fn fetch_rates(&self, _base: &str) -> Result<HashMap<String, f64>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(HashMap::from([("GBP".to_string(), 0.80)]))
        }
    }

    #[tokio::test]
    async fn test_two_runs_within_ttl_are_identical_with_no_extra_calls() {
        let history = Arc::new(CountingHistoryProvider {
            call_count: AtomicUsize::new(0),
        });
        let fx = Arc::new(CountingFxProvider {
            call_count: AtomicUsize::new(0),
        });
        let store = Arc::new(MemoryStore::new());

        let prices = PriceSeriesCache::new(
            Arc::clone(&history) as _,
            Arc::clone(&store) as _,
            vec!["AAPL".to_string(), "NVDA".to_string()],
        );
        let rate_cache = FxRateCache::new(Arc::clone(&fx) as _, Arc::clone(&store) as _);
        let pipeline = Pipeline::new(prices, Normalizer::new(rate_cache, "USD", "GBP"));

        let first = pipeline.run().await.unwrap();
        let second = pipeline.run().await.unwrap();

        assert_eq!(first, second);
        // One price call per symbol and one FX call, all on the first run.
        assert_eq!(history.call_count.load(Ordering::SeqCst), 2);
        assert_eq!(fx.call_count.load(Ordering::SeqCst), 1);

        let points = &first["AAPL"];
        assert_eq!(points[0].close, 79.20);
        assert_eq!(points[1].close, 80.00);
        assert!(points[0].date < points[1].date);
    }
}
