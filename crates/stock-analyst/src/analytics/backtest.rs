//! Strategy Backtester
//!
//! Daily-bar simulation of two long-only strategies. The walk is a strict
//! sequential fold over the series: each day's decision depends on state
//! accumulated from all prior days, so evaluation order is load-bearing
//! and must never be parallelized.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::indicators::{rsi, sma};
use crate::error::{AnalystError, Result};
use crate::model::OhlcvSeries;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

const SMA_FAST: usize = 50;
const SMA_SLOW: usize = 200;
const RSI_WINDOW: usize = 14;
const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Supported strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Long while SMA(50) > SMA(200); needs 200 days of warm-up
    SmaCrossover,
    /// Enter below RSI 30, exit above RSI 70
    RsiMeanReversion,
}

impl Strategy {
    pub fn parse(value: &str) -> Result<Strategy> {
        match value {
            "sma_crossover" => Ok(Strategy::SmaCrossover),
            "rsi_mean_reversion" => Ok(Strategy::RsiMeanReversion),
            other => Err(AnalystError::UnknownStrategy(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::SmaCrossover => "sma_crossover",
            Strategy::RsiMeanReversion => "rsi_mean_reversion",
        }
    }

    /// Minimum series length before any signal is defined
    fn warmup(self) -> usize {
        match self {
            Strategy::SmaCrossover => SMA_SLOW,
            Strategy::RsiMeanReversion => RSI_WINDOW + 1,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One executed trade, at that day's close
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: f64,
    pub shares: u64,
}

/// Transient simulation state; discarded after the summary is produced
struct BacktestState {
    capital: f64,
    shares: u64,
    trades: Vec<Trade>,
}

impl BacktestState {
    fn new(capital: f64) -> Self {
        Self {
            capital,
            shares: 0,
            trades: Vec::new(),
        }
    }

    fn is_flat(&self) -> bool {
        self.shares == 0
    }

    fn buy(&mut self, date: NaiveDate, price: f64) {
        let shares = (self.capital / price).floor() as u64;
        if shares == 0 {
            return;
        }
        self.capital -= shares as f64 * price;
        self.shares = shares;
        self.trades.push(Trade {
            date,
            action: TradeAction::Buy,
            price,
            shares,
        });
    }

    fn sell(&mut self, date: NaiveDate, price: f64) {
        let shares = self.shares;
        self.capital += shares as f64 * price;
        self.shares = 0;
        self.trades.push(Trade {
            date,
            action: TradeAction::Sell,
            price,
            shares,
        });
    }
}

/// Backtest summary
#[derive(Clone, Debug, Serialize)]
pub struct BacktestReport {
    pub strategy: Strategy,
    pub initial_capital: f64,
    /// Cash plus any open position marked at the last close
    pub final_value: f64,
    pub total_return_pct: f64,
    /// Buy-and-hold benchmark over the same window
    pub buy_hold_return_pct: f64,
    pub trades: Vec<Trade>,
    pub days_evaluated: usize,
}

/// Run a strategy over a series.
///
/// Trades execute at the decision day's close. The final day is never a
/// decision day: an open position is not liquidated, only marked to the
/// last close in `final_value`.
pub fn backtest(
    series: &OhlcvSeries,
    strategy: Strategy,
    initial_capital: f64,
) -> Result<BacktestReport> {
    let closes = series.closes();
    let dates = series.dates();
    let warmup = strategy.warmup();

    if closes.len() < warmup {
        return Err(AnalystError::InsufficientHistory {
            needed: warmup,
            got: closes.len(),
        });
    }

    let mut state = BacktestState::new(initial_capital);
    let start = warmup - 1;
    let last = closes.len() - 1;

    for i in start..last {
        let history = &closes[..=i];
        let price = closes[i];
        let date = dates[i];

        match strategy {
            Strategy::SmaCrossover => {
                let long_signal = sma(history, SMA_FAST)? > sma(history, SMA_SLOW)?;
                if long_signal && state.is_flat() {
                    state.buy(date, price);
                } else if !long_signal && !state.is_flat() {
                    state.sell(date, price);
                }
            }
            Strategy::RsiMeanReversion => {
                let value = rsi(history, RSI_WINDOW)?;
                if value < RSI_OVERSOLD && state.is_flat() {
                    state.buy(date, price);
                } else if value > RSI_OVERBOUGHT && !state.is_flat() {
                    state.sell(date, price);
                }
            }
        }
    }

    let last_close = closes[last];
    let final_value = state.capital + state.shares as f64 * last_close;
    let total_return_pct = (final_value / initial_capital - 1.0) * 100.0;
    let buy_hold_return_pct = (last_close / closes[0] - 1.0) * 100.0;

    Ok(BacktestReport {
        strategy,
        initial_capital,
        final_value,
        total_return_pct,
        buy_hold_return_pct,
        trades: state.trades,
        days_evaluated: last - start,
    })
}
