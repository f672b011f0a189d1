//! Risk Metrics Tool
//!
//! Annualized volatility, Sharpe ratio, and max drawdown over the trailing
//! year of daily closes.

use std::sync::Arc;

use async_trait::async_trait;

use analyst_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::analytics::risk_metrics;
use crate::cache::MarketDataCache;
use crate::error::{AnalystError, Result};
use crate::svckit::ANALYSIS_LOOKBACK_DAYS;

pub struct RiskMetricsTool {
    cache: Arc<MarketDataCache>,
}

impl RiskMetricsTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str) -> Result<String> {
        let series = self.cache.series(ticker, ANALYSIS_LOOKBACK_DAYS).await?;
        if series.is_empty() {
            return Err(AnalystError::DataUnavailable {
                ticker: ticker.to_uppercase(),
            });
        }

        let report = risk_metrics(&series.closes())?;
        Ok(format!(
            "Risk profile for {} (trailing year):\n  Annualized volatility: {:.1}%\n  Sharpe ratio: {:.2}\n  Max drawdown: {:.1}%",
            ticker.to_uppercase(),
            report.annualized_volatility * 100.0,
            report.sharpe_ratio,
            report.max_drawdown * 100.0
        ))
    }
}

#[async_trait]
impl Tool for RiskMetricsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "risk_metrics".into(),
            description: "Risk metrics over the trailing year: annualized volatility, Sharpe ratio, and maximum drawdown.".into(),
            parameters: vec![ParameterSchema {
                name: "ticker".into(),
                param_type: "string".into(),
                description: "Stock ticker symbol".into(),
                required: true,
                default: None,
            }],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();

        match self.report(ticker).await {
            Ok(output) => Ok(ToolResult::success("risk_metrics", output)),
            Err(e) => Ok(ToolResult::failure("risk_metrics", e.to_string())),
        }
    }
}
