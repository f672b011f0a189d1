//! # stock-analyst
//!
//! Domain layer for the agentic stock analyzer: market data access with a
//! bounded cache, deterministic analytics (indicators, risk, DCF valuation,
//! backtesting), the tool surface exposed to workers, and the analyst team
//! wiring.
//!
//! All analytics are pure and synchronous; IO happens only at the market
//! data provider boundary, behind the cache.

pub mod analytics;
pub mod cache;
pub mod error;
pub mod market;
pub mod model;
pub mod svckit;
pub mod workers;

pub use analytics::{
    backtest, free_cash_flow, intrinsic_value, macd, risk_metrics, rsi, sma, BacktestReport,
    DcfValuation, Macd, RiskReport, Strategy,
};
pub use cache::{MarketDataCache, CACHE_CAPACITY};
pub use error::{AnalystError, Result};
pub use market::{MarketDataProvider, MockMarketData};
pub use model::{Candle, CompanyProfile, OhlcvSeries};
pub use workers::all_workers;

/// Tool implementations, re-exported under a conventional name
pub mod tools {
    pub use crate::svckit::{
        BacktestTool, CompanyInfoTool, FetchPriceTool, FinancialMetricsTool, FreeCashFlowTool,
        IntrinsicValueTool, MacdTool, RiskMetricsTool, RsiTool, SmaTool, WebSearchTool,
    };
}
