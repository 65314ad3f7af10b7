use crate::error::IndexError;
use crate::indicators::IndexCalculator;
use crate::market_data::MarketDataSource;
use crate::models::IndexResult;
use chrono::Utc;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, instrument};

/// Serves index readings: fetches bars, computes, and keeps the last good
/// reading for a fixed revalidation interval.
///
/// Concurrent callers on a stale cache share a single upstream fetch.
pub struct IndexService<S> {
    source: S,
    calculator: IndexCalculator,
    revalidate: Duration,
    cached: Mutex<Option<(Instant, IndexResult)>>,
    fetching: AsyncMutex<()>,
}

impl<S: MarketDataSource> IndexService<S> {
    pub fn new(source: S, calculator: IndexCalculator, revalidate: Duration) -> Self {
        Self {
            source,
            calculator,
            revalidate,
            cached: Mutex::new(None),
            fetching: AsyncMutex::new(()),
        }
    }

    pub fn revalidate_interval(&self) -> Duration {
        self.revalidate
    }

    /// Cached reading if still fresh, otherwise a new one. Never fails.
    pub async fn current_index(&self) -> IndexResult {
        if let Some(result) = self.fresh_cached() {
            debug!("Serving cached index from {}", result.timestamp);
            return result;
        }

        let _fetching = self.fetching.lock().await;
        // another caller may have refreshed while we waited
        if let Some(result) = self.fresh_cached() {
            return result;
        }
        self.fetch_and_compute().await
    }

    /// Fetch and compute, bypassing the cache.
    pub async fn refresh(&self) -> IndexResult {
        let _fetching = self.fetching.lock().await;
        self.fetch_and_compute().await
    }

    #[instrument(skip(self), fields(source = %self.source.describe()))]
    async fn fetch_and_compute(&self) -> IndexResult {
        let bars = match self.source.fetch_daily_bars().await {
            Ok(bars) if bars.is_empty() => Err(IndexError::DataUnavailable),
            other => other,
        };

        match bars {
            Ok(bars) => {
                let result = self.calculator.compute(&bars);
                info!(
                    "Fear & greed index {} ({}) from {} bars",
                    result.current_index,
                    result.sentiment(),
                    bars.len()
                );
                *self.cached.lock() = Some((Instant::now(), result.clone()));
                result
            }
            Err(e) => {
                error!("Error calculating fear & greed index: {}", e);
                IndexResult::neutral(Utc::now())
            }
        }
    }

    fn fresh_cached(&self) -> Option<IndexResult> {
        let cached = self.cached.lock();
        cached
            .as_ref()
            .filter(|(at, _)| at.elapsed() < self.revalidate)
            .map(|(_, result)| result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::{PriceBar, MOMENTUM, VOLATILITY};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behaviour {
        Flat(usize),
        Empty,
        Fail,
    }

    struct StubSource {
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn new(behaviour: Behaviour) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    behaviour,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn fetch_daily_bars(&self) -> Result<Vec<PriceBar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match self.behaviour {
                Behaviour::Flat(n) => {
                    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
                    Ok((0..n)
                        .map(|i| {
                            let date = start + chrono::Duration::days(i as i64);
                            PriceBar::new(date, 100.0, 100.0, 100.0, 100.0, 1.0)
                        })
                        .collect())
                }
                Behaviour::Empty => Ok(Vec::new()),
                Behaviour::Fail => Err(IndexError::upstream("connection refused")),
            }
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn service(behaviour: Behaviour, revalidate: Duration) -> (IndexService<StubSource>, Arc<AtomicUsize>) {
        let (source, calls) = StubSource::new(behaviour);
        (
            IndexService::new(source, IndexCalculator::default(), revalidate),
            calls,
        )
    }

    #[tokio::test]
    async fn test_computes_reading() {
        let (service, _) = service(Behaviour::Flat(130), Duration::from_secs(300));
        let result = service.current_index().await;

        assert_eq!(result.current_index, 75);
        assert_eq!(result.indicator(MOMENTUM).unwrap().value, 50.0);
        assert_eq!(result.indicator(VOLATILITY).unwrap().value, 100.0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_neutral() {
        let (service, _) = service(Behaviour::Fail, Duration::from_secs(300));
        let result = service.current_index().await;

        assert_eq!(result.current_index, 50);
        assert_eq!(result.indicators, IndexResult::neutral(result.timestamp).indicators);
    }

    #[tokio::test]
    async fn test_empty_data_is_neutral() {
        let (service, _) = service(Behaviour::Empty, Duration::from_secs(300));
        assert_eq!(service.current_index().await.current_index, 50);
    }

    #[tokio::test]
    async fn test_caches_within_interval() {
        let (service, calls) = service(Behaviour::Flat(130), Duration::from_secs(300));

        let first = service.current_index().await;
        let second = service.current_index().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let (service, calls) = service(Behaviour::Flat(130), Duration::from_secs(300));

        let (first, second) = tokio::join!(service.current_index(), service.current_index());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let (service, calls) = service(Behaviour::Flat(130), Duration::from_secs(300));

        service.current_index().await;
        service.refresh().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_interval_always_fetches() {
        let (service, calls) = service(Behaviour::Flat(130), Duration::ZERO);

        service.current_index().await;
        service.current_index().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fallback_not_cached() {
        let (service, calls) = service(Behaviour::Fail, Duration::from_secs(300));

        service.current_index().await;
        service.current_index().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
