use crate::error::{Error, Result};
use crate::providers::FxRateProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

const PROVIDER: &str = "exchange rate API";

/// Live exchange rates from the open.er-api.com `latest` endpoint.
pub struct OpenErApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("stockplot/0.1")
            .build()
            .map_err(|e| Error::ProviderUnavailable {
                provider: PROVIDER,
                detail: format!("could not build HTTP client: {e}"),
            })?;
        Ok(OpenErApiProvider {
            base_url: base_url.to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[async_trait]
impl FxRateProvider for OpenErApiProvider {
    #[instrument(name = "FxRateFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>> {
        let url = format!("{}/v6/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::ProviderUnavailable {
                provider: PROVIDER,
                detail: format!("request failed for base {base}: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Error::ProviderUnavailable {
                provider: PROVIDER,
                detail: format!("HTTP {} for base {base}", response.status()),
            });
        }

        let data = response
            .json::<LatestRatesResponse>()
            .await
            .map_err(|e| Error::MalformedPayload {
                provider: PROVIDER,
                detail: format!("unparseable body for base {base}: {e}"),
            })?;

        // The API signals failure inside a 200 body.
        if data.result != "success" {
            return Err(Error::ProviderUnavailable {
                provider: PROVIDER,
                detail: format!("reported result {:?} for base {base}", data.result),
            });
        }

        Ok(data.rates)
    }
}
