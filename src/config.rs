use crate::error::{IndexError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FINNHUB_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_SYMBOL: &str = "OMXS30.ST";
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub finnhub: FinnhubConfig,
    pub market: MarketConfig,
    pub calculator: CalculatorConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FinnhubConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_FINNHUB_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub symbol: String,
    pub resolution: String,
    // Calendar days; has to cover the momentum window in trading days.
    pub lookback_days: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            resolution: "D".to_string(),
            lookback_days: 270,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub momentum_window: usize,
    pub trading_days_per_year: f64,
    pub momentum_weight: f64,
    pub volatility_weight: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            momentum_window: 125,
            trading_days_per_year: 252.0,
            momentum_weight: 0.5,
            volatility_weight: 0.5,
        }
    }
}

impl CalculatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.momentum_window == 0 {
            return Err(IndexError::Config("momentum_window must be greater than 0".into()));
        }
        if !(self.trading_days_per_year.is_finite() && self.trading_days_per_year > 0.0) {
            return Err(IndexError::Config("trading_days_per_year must be positive".into()));
        }
        for (name, weight) in [
            ("momentum_weight", self.momentum_weight),
            ("volatility_weight", self.volatility_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(IndexError::Config(format!("{} must be within [0, 1]", name)));
            }
        }
        if self.momentum_weight + self.volatility_weight <= 0.0 {
            return Err(IndexError::Config("at least one weight must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub revalidate_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { revalidate_secs: 300 }
    }
}

impl ServiceConfig {
    pub fn revalidate_interval(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

impl AppConfig {
    /// Layered load: built-in defaults, `config/default.*`, an optional
    /// explicit file, then `FGI__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix("FGI").separator("__"))
            .build()?;

        let mut app: AppConfig = settings.try_deserialize()?;

        if app.finnhub.api_key.is_empty() {
            if let Ok(key) = std::env::var("FINNHUB_API_KEY") {
                app.finnhub.api_key = key;
            }
        }

        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        self.calculator.validate()?;
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.market.lookback_days) {
            return Err(IndexError::Config(format!(
                "lookback_days must be within [1, {}]",
                MAX_LOOKBACK_DAYS
            )));
        }
        if self.market.symbol.is_empty() {
            return Err(IndexError::Config("market symbol is empty".into()));
        }
        Ok(())
    }
}
