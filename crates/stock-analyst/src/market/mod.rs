//! Market Data Integration
//!
//! Abstraction over daily price and fundamentals sources.

mod mock;

pub use mock::MockMarketData;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{CompanyProfile, OhlcvSeries};

/// Market data source (Strategy pattern)
///
/// Implement this per vendor. An unknown ticker yields an empty series and
/// an empty profile, not an error - absence of data is a valid answer.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch daily OHLCV for the most recent `lookback_days` trading days
    async fn fetch_ohlcv(&self, ticker: &str, lookback_days: u32) -> Result<OhlcvSeries>;

    /// Fetch named fundamentals; missing keys are simply `None`
    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile>;

    /// Provider name
    fn name(&self) -> &str;
}
