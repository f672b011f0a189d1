//! Valuation Tools
//!
//! Free cash flow extraction and the 5-year DCF fair value model.

use std::sync::Arc;

use async_trait::async_trait;

use analyst_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::analytics::{free_cash_flow, intrinsic_value};
use crate::cache::MarketDataCache;
use crate::error::Result;
use crate::svckit::fmt_usd;

fn ticker_param() -> ParameterSchema {
    ParameterSchema {
        name: "ticker".into(),
        param_type: "string".into(),
        description: "Stock ticker symbol".into(),
        required: true,
        default: None,
    }
}

pub struct FreeCashFlowTool {
    cache: Arc<MarketDataCache>,
}

impl FreeCashFlowTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str) -> Result<String> {
        let profile = self.cache.profile(ticker).await?;
        let fcf = free_cash_flow(&profile)?;
        Ok(format!("{} free cash flow: {}", profile.ticker, fmt_usd(fcf)))
    }
}

#[async_trait]
impl Tool for FreeCashFlowTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_free_cash_flow".into(),
            description: "Free cash flow for a company, derived from operating cash flow and capital expenditure when not directly reported.".into(),
            parameters: vec![ticker_param()],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();

        match self.report(ticker).await {
            Ok(output) => Ok(ToolResult::success("get_free_cash_flow", output)),
            Err(e) => Ok(ToolResult::failure("get_free_cash_flow", e.to_string())),
        }
    }
}

pub struct IntrinsicValueTool {
    cache: Arc<MarketDataCache>,
}

impl IntrinsicValueTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str) -> Result<String> {
        let profile = self.cache.profile(ticker).await?;
        let dcf = intrinsic_value(&profile)?;

        let verdict = if dcf.margin_of_safety_pct > 0.0 {
            "undervalued"
        } else {
            "overvalued"
        };

        Ok(format!(
            "DCF valuation for {}:\n  Discount rate (CAPM): {:.1}%\n  FCF growth rate: {:.1}%\n  Enterprise value: {}\n  Equity value: {}\n  Fair value per share: ${:.2}\n  Current price: ${:.2}\n  Margin of safety: {:.1}% ({verdict})",
            profile.ticker,
            dcf.discount_rate * 100.0,
            dcf.growth_rate * 100.0,
            fmt_usd(dcf.enterprise_value),
            fmt_usd(dcf.equity_value),
            dcf.fair_value_per_share,
            dcf.current_price,
            dcf.margin_of_safety_pct
        ))
    }
}

#[async_trait]
impl Tool for IntrinsicValueTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "calculate_intrinsic_value".into(),
            description: "5-year discounted cash flow model: CAPM discount rate, projected FCF, terminal value, fair value per share, and margin of safety.".into(),
            parameters: vec![ticker_param()],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();

        match self.report(ticker).await {
            Ok(output) => Ok(ToolResult::success("calculate_intrinsic_value", output)),
            Err(e) => Ok(ToolResult::failure("calculate_intrinsic_value", e.to_string())),
        }
    }
}
