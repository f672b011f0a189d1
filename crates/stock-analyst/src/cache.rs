//! Market Data Cache
//!
//! Bounded memoized lookup from (ticker, lookback window) to an OHLCV
//! series, shared across sessions. Entries are immutable once inserted and
//! carry no TTL; staleness within a process lifetime is an accepted
//! limitation. `try_get_with` gives one atomic fetch-or-populate per key,
//! so concurrent lookups of the same key trigger a single provider fetch.

use std::sync::Arc;

use moka::future::Cache;

use crate::error::{AnalystError, Result};
use crate::market::MarketDataProvider;
use crate::model::{CompanyProfile, OhlcvSeries};

/// Maximum number of (ticker, lookback) series kept resident
pub const CACHE_CAPACITY: u64 = 10;

type CacheKey = (String, u32);

/// Bounded price-series cache in front of a market data provider
pub struct MarketDataCache {
    provider: Arc<dyn MarketDataProvider>,
    series: Cache<CacheKey, Arc<OhlcvSeries>>,
}

impl MarketDataCache {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            series: Cache::builder().max_capacity(CACHE_CAPACITY).build(),
        }
    }

    /// Fetch-or-populate the series for a ticker and lookback window
    pub async fn series(&self, ticker: &str, lookback_days: u32) -> Result<Arc<OhlcvSeries>> {
        let key = (ticker.to_uppercase(), lookback_days);
        let provider = Arc::clone(&self.provider);
        let fetch_ticker = key.0.clone();

        self.series
            .try_get_with(key, async move {
                tracing::debug!(ticker = %fetch_ticker, lookback_days, "cache miss, fetching");
                provider
                    .fetch_ohlcv(&fetch_ticker, lookback_days)
                    .await
                    .map(Arc::new)
            })
            .await
            .map_err(|e: Arc<AnalystError>| AnalystError::Provider(e.to_string()))
    }

    /// Fundamentals pass through uncached; profile payloads are small and
    /// fetched far less often than price series
    pub async fn profile(&self, ticker: &str) -> Result<CompanyProfile> {
        self.provider.fetch_profile(ticker).await
    }

    pub fn entry_count(&self) -> u64 {
        self.series.entry_count()
    }

    #[cfg(test)]
    async fn run_pending_tasks(&self) {
        self.series.run_pending_tasks().await;
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Candle;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for CountingProvider {
        async fn fetch_ohlcv(&self, _ticker: &str, lookback_days: u32) -> Result<OhlcvSeries> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let candles = (0..lookback_days)
                .map(|i| Candle {
                    date: base + chrono::Days::new(u64::from(i)),
                    open: 100.0,
                    high: 101.0,
                    low: 99.0,
                    close: 100.0,
                    volume: 1,
                })
                .collect();
            Ok(OhlcvSeries::new(candles))
        }

        async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile> {
            Ok(CompanyProfile::empty(ticker))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_repeated_lookup_fetches_once() {
        let provider = Arc::new(CountingProvider {
            fetches: AtomicUsize::new(0),
        });
        let cache = MarketDataCache::new(provider.clone());

        let a = cache.series("aapl", 30).await.unwrap();
        let b = cache.series("AAPL", 30).await.unwrap();

        assert_eq!(a.len(), b.len());
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_lookbacks_are_distinct_keys() {
        let provider = Arc::new(CountingProvider {
            fetches: AtomicUsize::new(0),
        });
        let cache = MarketDataCache::new(provider.clone());

        cache.series("AAPL", 30).await.unwrap();
        cache.series("AAPL", 90).await.unwrap();

        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_capacity_bound_holds_under_pressure() {
        let provider = Arc::new(CountingProvider {
            fetches: AtomicUsize::new(0),
        });
        let cache = MarketDataCache::new(provider.clone());

        for i in 0..20u32 {
            cache.series(&format!("TK{i}"), 30).await.unwrap();
        }
        cache.run_pending_tasks().await;

        assert_eq!(provider.fetches.load(Ordering::SeqCst), 20);
        assert!(cache.entry_count() <= CACHE_CAPACITY);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_fetch_once() {
        let provider = Arc::new(CountingProvider {
            fetches: AtomicUsize::new(0),
        });
        let cache = Arc::new(MarketDataCache::new(provider.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.series("MSFT", 60).await.unwrap().len() })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), 60);
        }
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
    }
}
