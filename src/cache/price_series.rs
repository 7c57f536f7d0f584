use crate::cache::CACHE_TTL_SECS;
use crate::error::{Error, Result};
use crate::providers::PriceHistoryProvider;
use crate::series::PricePayload;
use crate::store::CacheStore;
use chrono::{Local, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const STORE_KEY: &str = "stocks";

/// Strict freshness: an entry fetched exactly TTL seconds ago is stale.
fn is_fresh(fetched_at: i64, now: i64) -> bool {
    fetched_at + CACHE_TTL_SECS > now
}

/// Disk-cached daily price history for a fixed symbol list.
///
/// The payload covers every tracked symbol and its full history; it is
/// refreshed and persisted as a whole or not at all.
pub struct PriceSeriesCache {
    provider: Arc<dyn PriceHistoryProvider>,
    store: Arc<dyn CacheStore>,
    symbols: Vec<String>,
}

impl PriceSeriesCache {
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        store: Arc<dyn CacheStore>,
        symbols: Vec<String>,
    ) -> Self {
        Self {
            provider,
            store,
            symbols,
        }
    }

    /// Returns the cached payload when it is younger than the TTL, otherwise
    /// refetches every symbol and overwrites the cache.
    pub async fn load_or_fetch(&self) -> Result<PricePayload> {
        if let Some(value) = self.store.get(STORE_KEY) {
            match serde_json::from_value::<PricePayload>(value) {
                Ok(payload) if is_fresh(payload.last_modified, Utc::now().timestamp()) => {
                    info!("Using stock data as of {}", payload.readable_last_modified);
                    return Ok(payload);
                }
                Ok(payload) => {
                    debug!(
                        "Stock cache from {} is stale",
                        payload.readable_last_modified
                    );
                }
                Err(e) => {
                    warn!("Stock cache is unreadable, repopulating: {e}");
                }
            }
        }
        self.refresh().await
    }

    /// Fetches every tracked symbol and persists the combined payload. Any
    /// per-symbol failure aborts before the cache file is touched, leaving a
    /// previous payload (if any) on disk.
    async fn refresh(&self) -> Result<PricePayload> {
        info!(
            "Retrieving new stock market information for {} symbols...",
            self.symbols.len()
        );

        let mut series = BTreeMap::new();
        for symbol in &self.symbols {
            let raw = self.provider.fetch_daily_history(symbol).await?;
            debug!("Fetched {} daily bars for {symbol}", raw.days.len());
            series.insert(symbol.clone(), raw);
        }

        let now = Utc::now();
        let payload = PricePayload {
            last_modified: now.timestamp(),
            readable_last_modified: Local::now().format("%c").to_string(),
            series,
        };
        let encoded = serde_json::to_value(&payload).map_err(Error::Encode)?;
        self.store.put(STORE_KEY, &encoded)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::RawSeries;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockHistoryProvider {
        call_count: AtomicUsize,
        fail: bool,
    }

    impl MockHistoryProvider {
        fn new(fail: bool) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl PriceHistoryProvider for MockHistoryProvider {
        async fn fetch_daily_history(&self, symbol: &str) -> Result<RawSeries> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::ProviderUnavailable {
                    provider: "mock",
                    detail: "down".to_string(),
                });
            }
            let raw = json!({
                "Time Series (Daily)": {
                    "2024-01-02": {"4. close": "100.00"},
                    "2024-01-01": {"4. close": "99.00"}
                }
            });
            let mut series: RawSeries = serde_json::from_value(raw).unwrap();
            series.meta = Some(json!({"2. Symbol": symbol}));
            Ok(series)
        }
    }

    fn cache_with(
        provider: Arc<MockHistoryProvider>,
        store: Arc<MemoryStore>,
        symbols: &[&str],
    ) -> PriceSeriesCache {
        PriceSeriesCache::new(
            provider,
            store,
            symbols.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_freshness_is_strict_at_the_ttl_boundary() {
        let now = 1_700_000_000;
        assert!(!is_fresh(now - CACHE_TTL_SECS - 1, now));
        // Exactly one TTL old: stale. The FX cache treats this as fresh.
        assert!(!is_fresh(now - CACHE_TTL_SECS, now));
        assert!(is_fresh(now - CACHE_TTL_SECS + 1, now));
    }

    #[tokio::test]
    async fn test_miss_fetches_once_per_symbol_and_persists() {
        let provider = Arc::new(MockHistoryProvider::new(false));
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(Arc::clone(&provider), Arc::clone(&store), &["AAPL", "MSFT"]);

        let payload = cache.load_or_fetch().await.unwrap();
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
        assert_eq!(payload.series.len(), 2);
        assert!(payload.last_modified > 0);

        let persisted = store.get("stocks").expect("payload should be persisted");
        let persisted: PricePayload = serde_json::from_value(persisted).unwrap();
        assert_eq!(persisted.last_modified, payload.last_modified);
    }

    #[tokio::test]
    async fn test_fresh_entry_is_served_without_provider_calls() {
        let provider = Arc::new(MockHistoryProvider::new(false));
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                "stocks",
                &json!({
                    "last_modified": Utc::now().timestamp() - 1_000,
                    "readable_last_modified": "recently",
                    "AAPL": {"Time Series (Daily)": {"2024-01-02": {"4. close": "1.00"}}}
                }),
            )
            .unwrap();

        let cache = cache_with(Arc::clone(&provider), store, &["AAPL"]);
        let payload = cache.load_or_fetch().await.unwrap();
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 0);
        assert_eq!(payload.readable_last_modified, "recently");
    }

    #[tokio::test]
    async fn test_stale_entry_triggers_refresh() {
        let provider = Arc::new(MockHistoryProvider::new(false));
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                "stocks",
                &json!({
                    "last_modified": Utc::now().timestamp() - CACHE_TTL_SECS - 60,
                    "readable_last_modified": "yesterday",
                    "AAPL": {"Time Series (Daily)": {"2024-01-02": {"4. close": "1.00"}}}
                }),
            )
            .unwrap();

        let cache = cache_with(Arc::clone(&provider), Arc::clone(&store), &["AAPL"]);
        let payload = cache.load_or_fetch().await.unwrap();
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 1);
        assert_ne!(payload.readable_last_modified, "yesterday");
    }

    #[tokio::test]
    async fn test_corrupt_entry_repopulates_with_fresh_stamp() {
        let provider = Arc::new(MockHistoryProvider::new(false));
        let store = Arc::new(MemoryStore::new());
        store.put("stocks", &json!("not a payload")).unwrap();

        let cache = cache_with(Arc::clone(&provider), Arc::clone(&store), &["AAPL"]);
        let before = Utc::now().timestamp();
        let payload = cache.load_or_fetch().await.unwrap();

        assert_eq!(provider.call_count.load(Ordering::SeqCst), 1);
        assert!(payload.last_modified >= before);

        let persisted: PricePayload =
            serde_json::from_value(store.get("stocks").unwrap()).unwrap();
        assert!(persisted.last_modified >= before);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_previous_payload_on_disk() {
        let provider = Arc::new(MockHistoryProvider::new(true));
        let store = Arc::new(MemoryStore::new());
        let stale = json!({
            "last_modified": 1,
            "readable_last_modified": "long ago",
            "AAPL": {"Time Series (Daily)": {"2024-01-02": {"4. close": "1.00"}}}
        });
        store.put("stocks", &stale).unwrap();

        let cache = cache_with(Arc::clone(&provider), Arc::clone(&store), &["AAPL"]);
        let result = cache.load_or_fetch().await;
        assert!(matches!(result, Err(Error::ProviderUnavailable { .. })));

        // The stale payload survives the failed refresh untouched.
        assert_eq!(store.get("stocks"), Some(stale));
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_a_hit() {
        let provider = Arc::new(MockHistoryProvider::new(false));
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(Arc::clone(&provider), store, &["AAPL", "MSFT"]);

        let first = cache.load_or_fetch().await.unwrap();
        let second = cache.load_or_fetch().await.unwrap();
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
        assert_eq!(first.last_modified, second.last_modified);
    }
}
