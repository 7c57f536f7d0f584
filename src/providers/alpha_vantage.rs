use crate::error::{Error, Result};
use crate::providers::PriceHistoryProvider;
use crate::series::RawSeries;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

const PROVIDER: &str = "Alpha Vantage";

/// Daily time-series provider backed by the Alpha Vantage `query` endpoint.
pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AlphaVantageProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("stockplot/0.1")
            .build()
            .map_err(|e| Error::ProviderUnavailable {
                provider: PROVIDER,
                detail: format!("could not build HTTP client: {e}"),
            })?;
        Ok(AlphaVantageProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[async_trait]
impl PriceHistoryProvider for AlphaVantageProvider {
    #[instrument(
        name = "AlphaVantageFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_daily_history(&self, symbol: &str) -> Result<RawSeries> {
        let url = format!("{}/query", self.base_url);
        debug!("Requesting daily series from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
                ("apikey", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| Error::ProviderUnavailable {
                provider: PROVIDER,
                detail: format!("request failed for symbol {symbol}: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Error::ProviderUnavailable {
                provider: PROVIDER,
                detail: format!("HTTP {} for symbol {symbol}", response.status()),
            });
        }

        let text = response.text().await.map_err(|e| Error::ProviderUnavailable {
            provider: PROVIDER,
            detail: format!("could not read response body for symbol {symbol}: {e}"),
        })?;

        let series: RawSeries =
            serde_json::from_str(&text).map_err(|e| Error::MalformedPayload {
                provider: PROVIDER,
                detail: format!("unparseable body for symbol {symbol}: {e}"),
            })?;

        if series.days.is_empty() {
            // The API reports errors and rate limits inside a 200 body.
            return Err(Error::MalformedPayload {
                provider: PROVIDER,
                detail: api_notice(&text)
                    .unwrap_or_else(|| format!("no daily series for symbol {symbol}")),
            });
        }

        Ok(series)
    }
}

/// Pulls the human-readable notice out of an error/rate-limit body.
fn api_notice(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for field in ["Error Message", "Note", "Information"] {
        if let Some(Value::String(msg)) = value.get(field) {
            return Some(msg.clone());
        }
    }
    None
}
