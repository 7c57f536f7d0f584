use crate::cache::CACHE_TTL_SECS;
use crate::error::{Error, Result};
use crate::providers::FxRateProvider;
use crate::store::CacheStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Inclusive freshness: an entry fetched exactly TTL seconds ago still
/// counts as fresh. The price cache uses the strict comparison.
fn is_fresh(fetched_at: i64, now: i64) -> bool {
    fetched_at >= now - CACHE_TTL_SECS
}

/// On-disk shape: `{"GBP": 0.79, "last_modified": ...}`.
#[derive(Debug, Serialize, Deserialize)]
struct FxCacheEntry {
    last_modified: i64,
    #[serde(flatten)]
    rates: HashMap<String, f64>,
}

/// Disk-cached exchange rate for one currency pair.
pub struct FxRateCache {
    provider: Arc<dyn FxRateProvider>,
    store: Arc<dyn CacheStore>,
}

impl FxRateCache {
    pub fn new(provider: Arc<dyn FxRateProvider>, store: Arc<dyn CacheStore>) -> Self {
        Self { provider, store }
    }

    fn store_key(base: &str) -> String {
        format!("rates_{}", base.to_lowercase())
    }

    /// Returns the `base` -> `quote` rate, from cache when younger than the
    /// TTL, otherwise from the provider. Makes at most one provider call.
    pub async fn get_rate(&self, base: &str, quote: &str) -> Result<f64> {
        let key = Self::store_key(base);
        if let Some(value) = self.store.get(&key) {
            match serde_json::from_value::<FxCacheEntry>(value) {
                Ok(entry) if is_fresh(entry.last_modified, Utc::now().timestamp()) => {
                    if let Some(rate) = entry.rates.get(quote) {
                        info!("Using current stored exchange rate");
                        return Ok(*rate);
                    }
                    // Fresh entry for a different quote currency: refetch.
                }
                Ok(_) => {}
                Err(e) => warn!("Exchange rate cache is unreadable, refreshing: {e}"),
            }
        }

        info!("Refreshing exchange rate...");
        let rates = self.provider.fetch_rates(base).await?;
        let rate = rates
            .get(quote)
            .copied()
            .ok_or_else(|| Error::MalformedPayload {
                provider: "exchange rate API",
                detail: format!("no {quote} rate in response for base {base}"),
            })?;
        if rate <= 0.0 {
            return Err(Error::MalformedPayload {
                provider: "exchange rate API",
                detail: format!("non-positive {quote} rate {rate}"),
            });
        }

        let entry = FxCacheEntry {
            last_modified: Utc::now().timestamp(),
            rates: HashMap::from([(quote.to_string(), rate)]),
        };
        let encoded = serde_json::to_value(&entry).map_err(Error::Encode)?;
        self.store.put(&key, &encoded)?;
        Ok(rate)
    }
}
