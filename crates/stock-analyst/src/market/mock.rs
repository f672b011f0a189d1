//! Mock Market Data Provider
//!
//! For testing and demo purposes. Prices are a deterministic random walk
//! seeded by the ticker symbol, so repeated fetches of the same (ticker,
//! lookback) produce identical series.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc, Weekday};

use super::MarketDataProvider;
use crate::error::Result;
use crate::model::{Candle, CompanyProfile, OhlcvSeries};

/// Per-ticker seed data: (base price, name, sector, industry, beta,
/// P/E, shares outstanding, cash, debt, revenue growth, free cash flow)
type TickerRow = (
    f64,
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
);

pub struct MockMarketData;

impl Default for MockMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketData {
    pub fn new() -> Self {
        Self
    }

    fn row(ticker: &str) -> Option<TickerRow> {
        #[rustfmt::skip]
        let row = match ticker {
            "AAPL" => (232.0, "Apple Inc.", "Technology", "Consumer Electronics", 1.24, 35.2, 15.2e9, 65.0e9, 96.0e9, 0.06, 108.0e9),
            "MSFT" => (428.0, "Microsoft Corporation", "Technology", "Software - Infrastructure", 0.90, 36.5, 7.43e9, 75.5e9, 97.0e9, 0.14, 74.0e9),
            "NVDA" => (134.0, "NVIDIA Corporation", "Technology", "Semiconductors", 1.66, 55.0, 24.5e9, 38.5e9, 10.0e9, 0.55, 60.7e9),
            "GOOGL" => (192.0, "Alphabet Inc.", "Communication Services", "Internet Content & Information", 1.03, 25.8, 12.3e9, 96.0e9, 28.0e9, 0.12, 72.8e9),
            "AMZN" => (224.0, "Amazon.com, Inc.", "Consumer Cyclical", "Internet Retail", 1.19, 47.0, 10.5e9, 101.0e9, 130.0e9, 0.11, 38.2e9),
            "META" => (612.0, "Meta Platforms, Inc.", "Communication Services", "Internet Content & Information", 1.21, 28.6, 2.53e9, 77.8e9, 49.5e9, 0.19, 54.1e9),
            "TSLA" => (404.0, "Tesla, Inc.", "Consumer Cyclical", "Auto Manufacturers", 2.30, 110.0, 3.22e9, 33.6e9, 13.6e9, 0.02, 3.6e9),
            "JPM" => (245.0, "JPMorgan Chase & Co.", "Financial Services", "Banks - Diversified", 1.10, 13.5, 2.82e9, 0.0, 0.0, 0.09, 0.0),
            "KO" => (63.0, "The Coca-Cola Company", "Consumer Defensive", "Beverages - Non-Alcoholic", 0.59, 28.0, 4.31e9, 13.8e9, 44.5e9, 0.03, 9.5e9),
            "XOM" => (107.0, "Exxon Mobil Corporation", "Energy", "Oil & Gas Integrated", 0.88, 13.9, 4.33e9, 26.5e9, 41.7e9, -0.05, 34.4e9),
            _ => return None,
        };
        Some(row)
    }

    /// The most recent `n` business days, ascending
    fn trading_days(n: u32) -> Vec<NaiveDate> {
        let mut day = Utc::now().date_naive();
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day = day.pred_opt().unwrap_or(day);
        }

        let mut days = Vec::with_capacity(n as usize);
        while days.len() < n as usize {
            days.push(day);
            day = day.pred_opt().unwrap_or(day);
            while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                day = day.pred_opt().unwrap_or(day);
            }
        }
        days.reverse();
        days
    }

    /// Deterministic walk: the candle values depend only on the ticker
    /// seed and position, never on wall-clock time
    fn synthesize(ticker: &str, base_price: f64, beta: f64, days: &[NaiveDate]) -> Vec<Candle> {
        let mut state = ticker
            .bytes()
            .fold(0x9E37_79B9_7F4A_7C15_u64, |acc, b| {
                (acc ^ u64::from(b)).wrapping_mul(0x100_0000_01B3)
            })
            .max(1);

        let mut next = move || {
            // xorshift64*
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            let bits = state.wrapping_mul(0x2545_F491_4F6C_DD1D);
            (bits >> 11) as f64 / (1u64 << 53) as f64
        };

        // The walk is seeded at the start of the requested window, so the
        // same (ticker, lookback) pair always yields the same path but a
        // shorter lookback is not a suffix of a longer one.
        let daily_vol = 0.012 * beta.max(0.2);
        let drift = 0.0003;

        let mut price = base_price * 0.85;
        let mut candles = Vec::with_capacity(days.len());
        for (i, date) in days.iter().enumerate() {
            let shock = (next() - 0.5) * 2.0 * daily_vol;
            let ret = drift + shock;
            let open = price;
            price *= 1.0 + ret;
            let close = price;
            let high = open.max(close) * (1.0 + next() * 0.004);
            let low = open.min(close) * (1.0 - next() * 0.004);
            let volume = 20_000_000 + (next() * 40_000_000.0) as u64 + (i as u64 % 7) * 100_000;
            candles.push(Candle {
                date: *date,
                open,
                high,
                low,
                close,
                volume,
            });
        }
        candles
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn fetch_ohlcv(&self, ticker: &str, lookback_days: u32) -> Result<OhlcvSeries> {
        let ticker = ticker.to_uppercase();
        let Some((base_price, _, _, _, beta, ..)) = Self::row(&ticker) else {
            tracing::debug!(%ticker, "unknown ticker, returning empty series");
            return Ok(OhlcvSeries::empty());
        };

        let days = Self::trading_days(lookback_days);
        Ok(OhlcvSeries::new(Self::synthesize(
            &ticker, base_price, beta, &days,
        )))
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile> {
        let ticker = ticker.to_uppercase();
        let Some((price, name, sector, industry, beta, pe, shares, cash, debt, growth, fcf)) =
            Self::row(&ticker)
        else {
            return Ok(CompanyProfile::empty(ticker));
        };

        Ok(CompanyProfile {
            ticker: ticker.clone(),
            name: Some(name.into()),
            sector: Some(sector.into()),
            industry: Some(industry.into()),
            summary: Some(format!(
                "{} operates in the {} sector ({}).",
                name, sector, industry
            )),
            market_cap: Some(price * shares),
            pe_ratio: Some(pe),
            beta: Some(beta),
            profit_margin: Some(0.18),
            revenue_growth: Some(growth),
            shares_outstanding: Some(shares),
            total_cash: Some(cash),
            total_debt: Some(debt),
            free_cash_flow: (fcf > 0.0).then_some(fcf),
            operating_cash_flow: (fcf > 0.0).then_some(fcf * 1.4),
            capital_expenditure: (fcf > 0.0).then_some(-fcf * 0.4),
            current_price: Some(price),
            fifty_two_week_high: Some(price * 1.15),
            fifty_two_week_low: Some(price * 0.72),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
