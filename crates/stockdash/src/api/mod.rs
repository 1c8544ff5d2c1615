//! Market data providers

pub mod yahoo;

pub use yahoo::YahooFinanceSource;

use crate::error::Result;
use crate::series::PriceSeries;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Historical daily prices by symbol and date range
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch daily bars for `ticker` from `start` (inclusive) to `end` (exclusive)
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;
}
