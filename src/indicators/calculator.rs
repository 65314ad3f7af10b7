use super::momentum::MomentumCalculator;
use super::volatility::VolatilityCalculator;
use crate::config::CalculatorConfig;
use crate::error::{IndexError, Result};
use crate::models::{closes, IndexResult, Indicator, PriceBar, MOMENTUM, NEUTRAL_SCORE, VOLATILITY};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Turns a daily bar series into a fear & greed reading.
///
/// Stateless apart from its configuration; one calculator can serve any
/// number of invocations.
#[derive(Debug, Clone, Default)]
pub struct IndexCalculator {
    config: CalculatorConfig,
}

impl IndexCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn compute(&self, bars: &[PriceBar]) -> IndexResult {
        self.compute_at(bars, Utc::now())
    }

    /// Compute with an explicit clock.
    ///
    /// Empty input yields the neutral result. An indicator that cannot be
    /// computed falls back to 50 on its own while the other keeps its value.
    pub fn compute_at(&self, bars: &[PriceBar], now: DateTime<Utc>) -> IndexResult {
        if bars.is_empty() {
            warn!("Error calculating fear & greed index: {}", IndexError::DataUnavailable);
            return IndexResult::neutral(now);
        }

        let closes = closes(bars);

        let momentum = MomentumCalculator::score(&closes, self.config.momentum_window)
            .unwrap_or_else(|e| {
                warn!("Error calculating momentum: {}", e);
                NEUTRAL_SCORE
            });

        let volatility = VolatilityCalculator::score(&closes, self.config.trading_days_per_year)
            .unwrap_or_else(|e| {
                warn!("Error calculating volatility: {}", e);
                NEUTRAL_SCORE
            });

        let indicators: BTreeMap<String, Indicator> = [
            Indicator::new(MOMENTUM, momentum, self.config.momentum_weight),
            Indicator::new(VOLATILITY, volatility, self.config.volatility_weight),
        ]
        .into_iter()
        .map(|i| (i.name.clone(), i))
        .collect();

        let current_index = aggregate(indicators.values()).unwrap_or_else(|e| {
            warn!("Error aggregating indicators: {}", e);
            NEUTRAL_SCORE as u8
        });

        debug!(
            bars = bars.len(),
            momentum,
            volatility,
            current_index,
            "Calculated fear & greed index"
        );

        IndexResult {
            timestamp: now,
            current_index,
            indicators,
        }
    }
}

/// Weighted mean of indicator values, rounded and clamped to 0..=100.
pub fn aggregate<'a>(indicators: impl IntoIterator<Item = &'a Indicator>) -> Result<u8> {
    let (total_value, total_weight) = indicators
        .into_iter()
        .fold((0.0, 0.0), |(value, weight), i| {
            (value + i.value * i.weight, weight + i.weight)
        });

    if total_weight <= 0.0 {
        return Err(IndexError::undefined("total indicator weight is not positive"));
    }

    let index = (total_value / total_weight).round();
    if !index.is_finite() {
        return Err(IndexError::undefined("weighted index is not finite"));
    }

    Ok(index.clamp(0.0, 100.0) as u8)
}
