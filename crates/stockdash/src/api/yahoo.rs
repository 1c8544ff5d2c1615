//! Yahoo Finance quote history

use super::MarketDataSource;
use crate::error::{DashboardError, Result};
use crate::series::{PriceBar, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Daily bars from Yahoo Finance
#[derive(Debug, Clone)]
pub struct YahooFinanceSource {
    timeout: Duration,
}

impl YahooFinanceSource {
    /// Create a source whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn to_offset(symbol: &str, date: NaiveDate) -> Result<OffsetDateTime> {
        let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        OffsetDateTime::from_unix_timestamp(ts).map_err(|e| DashboardError::MarketData {
            symbol: symbol.to_string(),
            reason: format!("Invalid date {date}: {e}"),
        })
    }

    async fn request(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let market_error = |e: yahoo::YahooError| DashboardError::MarketData {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        };

        let provider = yahoo::YahooConnector::new().map_err(market_error)?;
        let (start, end) = (Self::to_offset(symbol, start)?, Self::to_offset(symbol, end)?);
        let response = provider
            .get_quote_history(symbol, start, end)
            .await
            .map_err(market_error)?;

        let quotes = response.quotes().map_err(|e| DashboardError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    adj_close: q.adjclose,
                    volume: q.volume,
                })
            })
            .collect();

        if bars.is_empty() {
            return Err(DashboardError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("No rows between {start} and {end}"),
            });
        }

        Ok(PriceSeries::new(symbol, bars))
    }
}

impl Default for YahooFinanceSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceSource {
    #[instrument(skip(self))]
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let series = tokio::time::timeout(self.timeout, self.request(ticker, start, end))
            .await
            .map_err(|_| DashboardError::Timeout {
                symbol: ticker.to_string(),
                seconds: self.timeout.as_secs(),
            })??;

        debug!(rows = series.len(), "Fetched quote history");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_conversion_is_midnight_utc() {
        let odt = YahooFinanceSource::to_offset("AAPL", date(2024, 1, 1)).unwrap();
        assert_eq!(odt.unix_timestamp(), 1_704_067_200);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_history() {
        let source = YahooFinanceSource::default();
        let series = source
            .fetch_history("AAPL", date(2024, 1, 1), date(2024, 2, 1))
            .await
            .unwrap();

        assert_eq!(series.ticker(), "AAPL");
        assert!(!series.is_empty());
        assert!(series.bars().iter().all(|b| b.date >= date(2024, 1, 1)));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol_errors() {
        let source = YahooFinanceSource::default();
        let result = source
            .fetch_history("NOTAREALTICKERXYZ", date(2024, 1, 1), date(2024, 2, 1))
            .await;
        assert!(result.is_err());
    }
}
