//! Domain Models
//!
//! Price series and company fundamentals as returned by the Market Data
//! Provider. An `OhlcvSeries` is immutable once built and strictly
//! ascending by date with no duplicates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of price data
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily OHLCV series, ascending by date
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OhlcvSeries {
    candles: Vec<Candle>,
}

impl OhlcvSeries {
    /// Build a series, normalizing input order and collapsing duplicate
    /// dates (the later entry wins)
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.date);
        candles.dedup_by_key(|c| c.date);
        Self { candles }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Trading dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.candles.iter().map(|c| c.date).collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// The most recent `n` closes (or fewer if the series is shorter)
    pub fn tail_closes(&self, n: usize) -> Vec<f64> {
        let start = self.candles.len().saturating_sub(n);
        self.candles[start..].iter().map(|c| c.close).collect()
    }
}

/// Named fundamentals for a company. Every field is optional: providers
/// routinely omit keys, and absence is valid data, not a failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub ticker: String,

    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub summary: Option<String>,

    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub beta: Option<f64>,
    pub profit_margin: Option<f64>,

    /// Analyst revenue-growth estimate, as a fraction (0.08 = 8%)
    pub revenue_growth: Option<f64>,

    pub shares_outstanding: Option<f64>,
    pub total_cash: Option<f64>,
    pub total_debt: Option<f64>,

    /// Directly reported trailing free cash flow
    pub free_cash_flow: Option<f64>,
    /// Operating cash flow, for the FCF fallback computation
    pub operating_cash_flow: Option<f64>,
    /// Capital expenditure; conventionally reported as a negative number
    pub capital_expenditure: Option<f64>,

    pub current_price: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

impl CompanyProfile {
    /// Profile for a ticker with no known fundamentals
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(y: i32, m: u32, d: u32, close: f64) -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let series = OhlcvSeries::new(vec![
            candle(2024, 1, 3, 3.0),
            candle(2024, 1, 1, 1.0),
            candle(2024, 1, 3, 3.5),
            candle(2024, 1, 2, 2.0),
        ]);

        assert_eq!(series.len(), 3);
        let dates = series.dates();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tail_closes() {
        let series = OhlcvSeries::new(vec![
            candle(2024, 1, 1, 1.0),
            candle(2024, 1, 2, 2.0),
            candle(2024, 1, 3, 3.0),
        ]);

        assert_eq!(series.tail_closes(2), vec![2.0, 3.0]);
        assert_eq!(series.tail_closes(10).len(), 3);
        assert_eq!(series.last_close(), Some(3.0));
    }
}
