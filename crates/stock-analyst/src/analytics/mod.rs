//! Deterministic Analytics
//!
//! Pure functions over close-price series and company fundamentals. No IO,
//! no hidden state: identical inputs always produce identical outputs.

pub mod backtest;
pub mod indicators;
pub mod risk;
pub mod valuation;

pub use backtest::{backtest, BacktestReport, Strategy, Trade, TradeAction, DEFAULT_INITIAL_CAPITAL};
pub use indicators::{macd, rsi, sma, Macd};
pub use risk::{risk_metrics, RiskReport};
pub use valuation::{free_cash_flow, intrinsic_value, DcfValuation};
