//! TTL cache in front of a market data source

use crate::api::MarketDataSource;
use crate::error::Result;
use crate::series::PriceSeries;
use async_trait::async_trait;
use cached::{Cached, TimedCache};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache key for one history request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchKey {
    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
        }
    }
}

/// Wraps a source so repeated reruns with unchanged inputs skip the network
///
/// A zero TTL turns the cache off and every call goes to the inner source.
pub struct CachedSource<S> {
    inner: S,
    cache: Option<Arc<RwLock<TimedCache<FetchKey, PriceSeries>>>>,
}

impl<S: MarketDataSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        let cache = (!ttl.is_zero()).then(|| Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))));
        Self { inner, cache }
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.read().await.cache_size(),
            None => 0,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every cached table
    pub async fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.write().await.cache_clear();
        }
    }
}

#[async_trait]
impl<S: MarketDataSource> MarketDataSource for CachedSource<S> {
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let Some(cache) = &self.cache else {
            return self.inner.fetch_history(ticker, start, end).await;
        };

        let key = FetchKey::new(ticker, start, end);
        if let Some(hit) = cache.write().await.cache_get(&key).cloned() {
            debug!("Cache hit for key: {:?}", key);
            return Ok(hit);
        }

        debug!("Cache miss for key: {:?}", key);
        let series = self.inner.fetch_history(ticker, start, end).await?;
        let _ = cache.write().await.cache_set(key, series.clone());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataSource;
    use crate::error::DashboardError;
    use crate::series::fixtures::series;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_repeated_fetch_hits_cache() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_fetch_history()
            .times(1)
            .returning(|ticker, _, _| Ok(series(ticker, &[1.0, 2.0])));

        let source = CachedSource::new(mock, Duration::from_secs(60));
        let first = source
            .fetch_history("AAPL", date(2024, 1, 1), date(2024, 2, 1))
            .await
            .unwrap();
        let second = source
            .fetch_history("AAPL", date(2024, 1, 1), date(2024, 2, 1))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(source.len().await, 1);
    }

    #[tokio::test]
    async fn test_different_range_is_a_new_key() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_fetch_history()
            .times(2)
            .returning(|ticker, _, _| Ok(series(ticker, &[1.0])));

        let source = CachedSource::new(mock, Duration::from_secs(60));
        source
            .fetch_history("AAPL", date(2024, 1, 1), date(2024, 2, 1))
            .await
            .unwrap();
        source
            .fetch_history("AAPL", date(2024, 1, 1), date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(source.len().await, 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_fetch_history()
            .times(2)
            .returning(|ticker, _, _| Ok(series(ticker, &[1.0])));

        let source = CachedSource::new(mock, Duration::ZERO);
        assert!(!source.is_enabled());
        for _ in 0..2 {
            source
                .fetch_history("MSFT", date(2024, 1, 1), date(2024, 2, 1))
                .await
                .unwrap();
        }
        assert!(source.is_empty().await);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_fetch_history().times(2).returning(|ticker, _, _| {
            Err(DashboardError::DataUnavailable {
                symbol: ticker.to_string(),
                reason: "No rows".to_string(),
            })
        });

        let source = CachedSource::new(mock, Duration::from_secs(60));
        for _ in 0..2 {
            assert!(
                source
                    .fetch_history("ZZZZ", date(2024, 1, 1), date(2024, 2, 1))
                    .await
                    .is_err()
            );
        }

        source.clear().await;
        assert!(source.is_empty().await);
    }
}
