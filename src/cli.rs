// src/cli.rs
use crate::config::AppConfig;
use crate::indicators::IndexCalculator;
use crate::market_data::{FinnhubClient, JsonFileSource, MarketDataSource};
use crate::models::IndexResult;
use crate::service::IndexService;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "fear-greed-index")]
#[command(about = "Market fear & greed index calculator", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch recent bars from Finnhub and print the index
    Compute {
        /// Symbol (e.g., "OMXS30.ST")
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// Compute the index from a JSON file of daily bars
    File {
        /// Input file
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Recompute the index on a fixed interval
    Watch {
        /// Symbol (e.g., "OMXS30.ST")
        #[arg(short, long)]
        symbol: Option<String>,

        /// Seconds between readings, defaults to the revalidation interval
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

/// Render a reading as JSON
pub fn render(result: &IndexResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

fn finnhub_service(config: &AppConfig, symbol: Option<String>) -> Result<IndexService<FinnhubClient>> {
    let mut market = config.market.clone();
    if let Some(symbol) = symbol {
        market.symbol = symbol;
    }

    let client = FinnhubClient::new(&config.finnhub, &market)
        .context("Failed to create Finnhub client")?;

    Ok(IndexService::new(
        client,
        IndexCalculator::new(config.calculator.clone()),
        config.service.revalidate_interval(),
    ))
}

async fn print_once<S: MarketDataSource>(service: &IndexService<S>, pretty: bool) -> Result<()> {
    let result = service.current_index().await;
    println!("{}", render(&result, pretty)?);
    Ok(())
}

/// Execute a command from the CLI
pub async fn execute_command(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Compute { symbol } => {
            let service = finnhub_service(&config, symbol)?;
            print_once(&service, cli.pretty).await?;
        }

        Commands::File { path } => {
            let service = IndexService::new(
                JsonFileSource::new(&path),
                IndexCalculator::new(config.calculator.clone()),
                config.service.revalidate_interval(),
            );
            print_once(&service, cli.pretty).await?;
        }

        Commands::Watch { symbol, interval_secs } => {
            let service = finnhub_service(&config, symbol)?;
            let period = interval_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| service.revalidate_interval())
                .max(Duration::from_secs(1));

            info!("Watching index, refreshing every {:?}", period);

            loop {
                let result = service.refresh().await;
                println!("{}", render(&result, cli.pretty)?);
                tokio::time::sleep(period).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parses_file_command() {
        let cli = Cli::parse_from(["fear-greed-index", "--pretty", "file", "--path", "bars.json"]);
        assert!(cli.pretty);
        match cli.command {
            Commands::File { path } => assert_eq!(path, PathBuf::from("bars.json")),
            _ => panic!("expected file command"),
        }
    }

    #[test]
    fn test_parses_watch_command() {
        let cli = Cli::parse_from([
            "fear-greed-index",
            "watch",
            "--symbol",
            "^OMX",
            "--interval-secs",
            "60",
            "--config",
            "fgi.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("fgi.toml")));
        match cli.command {
            Commands::Watch { symbol, interval_secs } => {
                assert_eq!(symbol.as_deref(), Some("^OMX"));
                assert_eq!(interval_secs, Some(60));
            }
            _ => panic!("expected watch command"),
        }
    }

    #[test]
    fn test_render_compact() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let json = render(&IndexResult::neutral(ts), false).unwrap();
        assert!(json.starts_with(r#"{"timestamp":"2024-01-02T03:04:05.000Z","currentIndex":50"#));
        assert!(!json.contains('\n'));
    }
}
