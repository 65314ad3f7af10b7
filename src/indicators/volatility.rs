use crate::error::{IndexError, Result};

pub struct VolatilityCalculator;

impl VolatilityCalculator {
    // Simple period-over-period returns: (p[i] - p[i-1]) / p[i-1]
    pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
        closes
            .windows(2)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect()
    }

    /// Population standard deviation. NaN for an empty series, exactly 0 for a constant one.
    pub fn standard_deviation(series: &[f64]) -> f64 {
        if let Some(first) = series.first() {
            if series.iter().all(|x| x == first) {
                return 0.0;
            }
        }

        let n = series.len() as f64;
        let mean = series.iter().sum::<f64>() / n;
        let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt()
    }

    /// Annualized volatility of daily returns, inverted onto a 0-100 scale.
    /// Calm markets score high, turbulent markets score low.
    pub fn score(closes: &[f64], trading_days: f64) -> Result<f64> {
        if closes.len() < 2 {
            return Err(IndexError::undefined(format!(
                "volatility needs at least 2 closes, got {}",
                closes.len()
            )));
        }

        let returns = Self::daily_returns(closes);
        let std = Self::standard_deviation(&returns);
        if !std.is_finite() {
            return Err(IndexError::undefined(
                "standard deviation of returns is not finite",
            ));
        }

        let annualized = std * trading_days.sqrt() * 100.0;
        Ok((100.0 - annualized * 2.0).clamp(0.0, 100.0))
    }
}
