use super::{normalize_bars, MarketDataSource};
use crate::config::{FinnhubConfig, MarketConfig};
use crate::error::{IndexError, Result};
use crate::models::PriceBar;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Raw `/stock/candle` payload. Arrays are parallel, one entry per bar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinnhubCandles {
    #[serde(default)]
    pub c: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub o: Vec<f64>,
    pub s: String,
    #[serde(default)]
    pub t: Vec<i64>,
    #[serde(default)]
    pub v: Vec<f64>,
}

impl FinnhubCandles {
    /// Validate the payload and turn it into ordered daily bars.
    pub fn into_price_bars(self) -> Result<Vec<PriceBar>> {
        match self.s.as_str() {
            "ok" => {}
            "no_data" => return Err(IndexError::DataUnavailable),
            other => {
                return Err(IndexError::upstream(format!(
                    "unexpected candle status '{}'",
                    other
                )))
            }
        }

        let n = self.c.len();
        if n == 0 {
            return Err(IndexError::DataUnavailable);
        }

        let lengths = [self.h.len(), self.l.len(), self.o.len(), self.t.len(), self.v.len()];
        if lengths.iter().any(|&len| len != n) {
            return Err(IndexError::upstream(format!(
                "candle arrays have mismatched lengths: c={} h={} l={} o={} t={} v={}",
                n, lengths[0], lengths[1], lengths[2], lengths[3], lengths[4]
            )));
        }

        let mut bars = Vec::with_capacity(n);
        for i in 0..n {
            let date = DateTime::<Utc>::from_timestamp(self.t[i], 0)
                .ok_or_else(|| IndexError::upstream(format!("invalid candle timestamp {}", self.t[i])))?
                .date_naive();

            bars.push(PriceBar {
                date,
                open: self.o[i],
                high: self.h[i],
                low: self.l[i],
                close: self.c[i],
                volume: self.v[i],
            });
        }

        Ok(normalize_bars(bars))
    }
}

/// Finnhub market data client. Holds its own credential; create one per
/// configuration rather than sharing a global instance.
pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: String,
    symbol: String,
    resolution: String,
    lookback: Duration,
}

impl FinnhubClient {
    pub fn new(finnhub: &FinnhubConfig, market: &MarketConfig) -> Result<Self> {
        if finnhub.api_key.is_empty() {
            return Err(IndexError::Config(
                "Finnhub API key is missing (set FINNHUB_API_KEY or FGI__FINNHUB__API_KEY)".into(),
            ));
        }

        let lookback = Duration::try_days(market.lookback_days)
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| {
                IndexError::Config(format!("invalid lookback of {} days", market.lookback_days))
            })?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(finnhub.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: finnhub.base_url.trim_end_matches('/').to_string(),
            api_key: finnhub.api_key.clone(),
            symbol: market.symbol.clone(),
            resolution: market.resolution.clone(),
            lookback,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Fetch candles between two instants.
    pub async fn get_candles(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<PriceBar>> {
        let url = format!("{}/stock/candle", self.base_url);
        debug!("Requesting {} candles for {} from {} to {}", self.resolution, self.symbol, from, to);

        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(&[
                ("symbol", self.symbol.clone()),
                ("resolution", self.resolution.clone()),
                ("from", from.timestamp().to_string()),
                ("to", to.timestamp().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("Failed to read error body for HTTP {}: {}", status, e);
                    String::new()
                }
            };
            return Err(IndexError::upstream(format!("HTTP {}: {}", status, body)));
        }

        let candles: FinnhubCandles = response.json().await?;
        let bars = candles.into_price_bars()?;

        info!("Fetched {} daily bars for {}", bars.len(), self.symbol);
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for FinnhubClient {
    async fn fetch_daily_bars(&self) -> Result<Vec<PriceBar>> {
        let to = Utc::now();
        let from = to.checked_sub_signed(self.lookback).ok_or_else(|| {
            IndexError::upstream(format!(
                "lookback of {} days is out of the supported date range",
                self.lookback.num_days()
            ))
        })?;
        self.get_candles(from, to).await
    }

    fn describe(&self) -> String {
        format!("finnhub:{}", self.symbol)
    }
}
