pub mod file;
pub mod finnhub;

use crate::error::Result;
use crate::models::PriceBar;
use async_trait::async_trait;

pub use self::file::JsonFileSource;
pub use self::finnhub::FinnhubClient;

/// Anything that can hand the calculator a daily bar series for one instrument.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Bars ordered oldest to newest with unique dates.
    async fn fetch_daily_bars(&self) -> Result<Vec<PriceBar>>;

    fn describe(&self) -> String;
}

/// Sort oldest to newest, keeping the last observation for a repeated date.
pub fn normalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.date);

    let mut result: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match result.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => result.push(bar),
        }
    }
    result
}
