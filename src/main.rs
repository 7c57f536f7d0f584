use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use stockplot::log::init_logging;
use stockplot::render::ChartMode;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch prices and draw charts (the default)
    Plot {
        /// Chart layout
        #[arg(short, long, value_enum, default_value_t = Mode::Combined)]
        mode: Mode,
        /// Restrict the chart to these symbols (repeatable)
        #[arg(short, long = "symbol")]
        symbols: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Combined,
    PerSymbol,
}

impl From<Mode> for ChartMode {
    fn from(mode: Mode) -> ChartMode {
        match mode {
            Mode::Combined => ChartMode::Combined,
            Mode::PerSymbol => ChartMode::PerSymbol,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Plot { mode, symbols }) => {
            stockplot::run_plot(
                stockplot::PlotOptions {
                    mode: mode.into(),
                    selection: symbols,
                },
                cli.config_path.as_deref(),
            )
            .await
        }
        // Plotting is the whole point; run it with defaults.
        None => {
            stockplot::run_plot(
                stockplot::PlotOptions {
                    mode: ChartMode::Combined,
                    selection: Vec::new(),
                },
                cli.config_path.as_deref(),
            )
            .await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> Result<()> {
    use anyhow::Context;

    let path = stockplot::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
symbols: [AAPL, AMZN, GOOGL, MSFT, NVDA]
base_currency: "USD"
target_currency: "GBP"

providers:
  alpha_vantage:
    base_url: "https://www.alphavantage.co"
    api_key_env: "alphavantage"
  exchange_rate:
    base_url: "https://open.er-api.com"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
