//! Backtest Tool
//!
//! Runs a named trading strategy over cached history and reports the
//! result against a buy-and-hold benchmark.

use std::sync::Arc;

use async_trait::async_trait;

use analyst_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::analytics::{backtest, Strategy, DEFAULT_INITIAL_CAPITAL};
use crate::cache::MarketDataCache;
use crate::error::{AnalystError, Result};
use crate::svckit::ANALYSIS_LOOKBACK_DAYS;

pub struct BacktestTool {
    cache: Arc<MarketDataCache>,
}

impl BacktestTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(
        &self,
        ticker: &str,
        strategy: Strategy,
        initial_capital: f64,
        days: u32,
    ) -> Result<String> {
        let series = self.cache.series(ticker, days).await?;
        if series.is_empty() {
            return Err(AnalystError::DataUnavailable {
                ticker: ticker.to_uppercase(),
            });
        }

        let report = backtest(&series, strategy, initial_capital)?;

        let mut output = format!(
            "Backtest of {strategy} on {} over {} trading days:\n  Initial capital: ${:.2}\n  Final value: ${:.2}\n  Total return: {:+.2}%\n  Buy-and-hold benchmark: {:+.2}%\n  Trades executed: {}\n",
            ticker.to_uppercase(),
            series.len(),
            report.initial_capital,
            report.final_value,
            report.total_return_pct,
            report.buy_hold_return_pct,
            report.trades.len()
        );

        for trade in &report.trades {
            output.push_str(&format!(
                "    {} {:?} {} shares @ ${:.2}\n",
                trade.date, trade.action, trade.shares, trade.price
            ));
        }

        Ok(output.trim_end().to_string())
    }
}

#[async_trait]
impl Tool for BacktestTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "backtest_strategy".into(),
            description: "Backtest a trading strategy over historical daily closes and compare against buy-and-hold.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "ticker".into(),
                    param_type: "string".into(),
                    description: "Stock ticker symbol".into(),
                    required: true,
                    default: None,
                },
                ParameterSchema {
                    name: "strategy".into(),
                    param_type: "string".into(),
                    description: "Strategy name: 'sma_crossover' or 'rsi_mean_reversion'".into(),
                    required: true,
                    default: None,
                },
                ParameterSchema {
                    name: "initial_capital".into(),
                    param_type: "number".into(),
                    description: "Starting capital in dollars".into(),
                    required: false,
                    default: Some(serde_json::json!(DEFAULT_INITIAL_CAPITAL)),
                },
                ParameterSchema {
                    name: "days".into(),
                    param_type: "number".into(),
                    description: "Simulation window in trading days".into(),
                    required: false,
                    default: Some(serde_json::json!(ANALYSIS_LOOKBACK_DAYS)),
                },
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();
        let strategy_name = call.str_arg("strategy").unwrap_or_default();
        let initial_capital = call
            .f64_arg("initial_capital")
            .filter(|c| *c > 0.0)
            .unwrap_or(DEFAULT_INITIAL_CAPITAL);
        let days = call
            .f64_arg("days")
            .map_or(ANALYSIS_LOOKBACK_DAYS, |d| d.max(1.0) as u32);

        let strategy = match Strategy::parse(strategy_name) {
            Ok(s) => s,
            Err(e) => return Ok(ToolResult::failure("backtest_strategy", e.to_string())),
        };

        match self.report(ticker, strategy, initial_capital, days).await {
            Ok(output) => Ok(ToolResult::success("backtest_strategy", output)),
            Err(e) => Ok(ToolResult::failure("backtest_strategy", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;

    fn tool() -> BacktestTool {
        BacktestTool::new(Arc::new(MarketDataCache::new(Arc::new(MockMarketData::new()))))
    }

    #[tokio::test]
    async fn test_rsi_strategy_over_a_year() {
        let call = ToolCall::new("backtest_strategy")
            .with_arg("ticker", serde_json::json!("AAPL"))
            .with_arg("strategy", serde_json::json!("rsi_mean_reversion"));
        let result = tool().execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("Final value: $"));
        assert!(result.output.contains("Buy-and-hold benchmark:"));
    }

    #[tokio::test]
    async fn test_short_window_sma_crossover_fails() {
        let call = ToolCall::new("backtest_strategy")
            .with_arg("ticker", serde_json::json!("AAPL"))
            .with_arg("strategy", serde_json::json!("sma_crossover"))
            .with_arg("days", serde_json::json!(150));
        let result = tool().execute(&call).await.unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Insufficient history"));
    }

    #[tokio::test]
    async fn test_unknown_strategy_name() {
        let call = ToolCall::new("backtest_strategy")
            .with_arg("ticker", serde_json::json!("AAPL"))
            .with_arg("strategy", serde_json::json!("momentum"));
        let result = tool().execute(&call).await.unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Unknown strategy"));
    }
}
