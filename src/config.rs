use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::error::Error;

fn default_symbols() -> Vec<String> {
    ["AAPL", "AMZN", "GOOGL", "MSFT", "NVDA"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_target_currency() -> String {
    "GBP".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlphaVantageConfig {
    #[serde(default = "AlphaVantageConfig::default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "AlphaVantageConfig::default_api_key_env")]
    pub api_key_env: String,
    /// Inline key, overriding the environment variable when set.
    pub api_key: Option<String>,
}

impl AlphaVantageConfig {
    fn default_base_url() -> String {
        "https://www.alphavantage.co".to_string()
    }

    fn default_api_key_env() -> String {
        "alphavantage".to_string()
    }
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        AlphaVantageConfig {
            base_url: Self::default_base_url(),
            api_key_env: Self::default_api_key_env(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateConfig {
    #[serde(default = "ExchangeRateConfig::default_base_url")]
    pub base_url: String,
}

impl ExchangeRateConfig {
    fn default_base_url() -> String {
        "https://open.er-api.com".to_string()
    }
}

impl Default for ExchangeRateConfig {
    fn default() -> Self {
        ExchangeRateConfig {
            base_url: Self::default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub alpha_vantage: AlphaVantageConfig,
    #[serde(default)]
    pub exchange_rate: ExchangeRateConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Tracked symbols, in display order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Currency the price provider quotes in.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Currency the charts are drawn in.
    #[serde(default = "default_target_currency")]
    pub target_currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Directory for the cache files; defaults to the platform cache dir.
    pub cache_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            symbols: default_symbols(),
            base_currency: default_base_currency(),
            target_currency: default_target_currency(),
            providers: ProvidersConfig::default(),
            cache_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it does not exist (the tool is usable with zero configuration).
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.cache_dir {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.cache_dir().to_path_buf())
    }

    /// Resolves the price provider API key: inline config first, then the
    /// configured environment variable. Checked before any network call.
    pub fn resolve_api_key(&self) -> std::result::Result<String, Error> {
        let av = &self.providers.alpha_vantage;
        if let Some(key) = av.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        match std::env::var(&av.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::MissingCredential {
                var: av.api_key_env.clone(),
            }),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("io", "stockplot", "stockplot")
            .context("Could not determine project directories")
    }
}
