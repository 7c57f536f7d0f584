pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod render;
pub mod series;
pub mod store;

use crate::cache::{FxRateCache, PriceSeriesCache};
use crate::normalize::Normalizer;
use crate::pipeline::Pipeline;
use crate::providers::{AlphaVantageProvider, OpenErApiProvider};
use crate::render::ChartMode;
use crate::store::JsonFileStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Options collected by the CLI for a plot run.
pub struct PlotOptions {
    pub mode: ChartMode,
    /// Symbols to render; empty means all tracked symbols.
    pub selection: Vec<String>,
}

/// Wires the pipeline from configuration, runs it once, and hands the result
/// to the terminal renderer.
pub async fn run_plot(options: PlotOptions, config_path: Option<&str>) -> Result<()> {
    info!("stockplot starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Fail on a missing credential before anything touches the network.
    let api_key = config.resolve_api_key()?;

    let store = Arc::new(JsonFileStore::new(config.cache_path()?));

    let price_provider = Arc::new(AlphaVantageProvider::new(
        &config.providers.alpha_vantage.base_url,
        &api_key,
    )?);
    let fx_provider = Arc::new(OpenErApiProvider::new(
        &config.providers.exchange_rate.base_url,
    )?);

    let price_cache = PriceSeriesCache::new(
        price_provider,
        Arc::clone(&store) as _,
        config.symbols.clone(),
    );
    let fx_cache = FxRateCache::new(fx_provider, store);
    let normalizer = Normalizer::new(fx_cache, &config.base_currency, &config.target_currency);

    let pipeline = Pipeline::new(price_cache, normalizer);
    let normalized = pipeline.run().await?;

    render::display(
        &normalized,
        options.mode,
        &options.selection,
        &config.target_currency,
    );
    Ok(())
}
