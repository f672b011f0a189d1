//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `analyst_core::Tool` over the
//! market data cache and the analytics library. Domain failures (no data,
//! short history, undefined valuation) are reported as unsuccessful
//! `ToolResult`s so the generation oracle can reason about them as text.

mod backtest;
mod fundamentals;
mod indicators;
mod price;
mod risk;
mod search;
mod valuation;

pub use backtest::BacktestTool;
pub use fundamentals::{CompanyInfoTool, FinancialMetricsTool};
pub use indicators::{MacdTool, RsiTool, SmaTool};
pub use price::FetchPriceTool;
pub use risk::RiskMetricsTool;
pub use search::WebSearchTool;
pub use valuation::{FreeCashFlowTool, IntrinsicValueTool};

/// Lookback used by indicator and risk tools; one calendar year of
/// trading days comfortably covers every indicator's warm-up
pub(crate) const ANALYSIS_LOOKBACK_DAYS: u32 = 365;

/// Compact dollar formatting for large fundamentals figures
pub(crate) fn fmt_usd(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1.0e12 {
        format!("${:.2}T", value / 1.0e12)
    } else if abs >= 1.0e9 {
        format!("${:.2}B", value / 1.0e9)
    } else if abs >= 1.0e6 {
        format!("${:.2}M", value / 1.0e6)
    } else {
        format!("${value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_usd_scales() {
        assert_eq!(fmt_usd(108.0e9), "$108.00B");
        assert_eq!(fmt_usd(3.4e12), "$3.40T");
        assert_eq!(fmt_usd(-250.0e6), "$-250.00M");
        assert_eq!(fmt_usd(42.5), "$42.50");
    }
}
