//! Fundamentals Tools
//!
//! Company profile and financial metrics lookups. Missing profile keys are
//! valid and rendered as "n/a" rather than treated as failures.

use std::sync::Arc;

use async_trait::async_trait;

use analyst_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::cache::MarketDataCache;
use crate::error::Result;
use crate::model::CompanyProfile;
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

fn money_line(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("  {label}: {}\n", fmt_usd(v)),
        None => format!("  {label}: n/a\n"),
    }
}

fn ratio_line(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("  {label}: {v:.2}\n"),
        None => format!("  {label}: n/a\n"),
    }
}

fn pct_line(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("  {label}: {:.1}%\n", v * 100.0),
        None => format!("  {label}: n/a\n"),
    }
}

pub struct FinancialMetricsTool {
    cache: Arc<MarketDataCache>,
}

impl FinancialMetricsTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str) -> Result<String> {
        let profile = self.cache.profile(ticker).await?;

        let mut output = format!("Financial metrics for {}:\n", profile.ticker);
        output.push_str(&money_line("Market cap", profile.market_cap));
        output.push_str(&ratio_line("P/E ratio", profile.pe_ratio));
        output.push_str(&ratio_line("Beta", profile.beta));
        output.push_str(&pct_line("Profit margin", profile.profit_margin));
        output.push_str(&pct_line("Revenue growth", profile.revenue_growth));
        output.push_str(&money_line("Total cash", profile.total_cash));
        output.push_str(&money_line("Total debt", profile.total_debt));
        output.push_str(&money_line("Free cash flow", profile.free_cash_flow));
        Ok(output.trim_end().to_string())
    }
}

#[async_trait]
impl Tool for FinancialMetricsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_financial_metrics".into(),
            description: "Key financial metrics for a company: market cap, P/E, beta, margins, growth, cash, and debt.".into(),
            parameters: vec![ticker_param()],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();

        match self.report(ticker).await {
            Ok(output) => Ok(ToolResult::success("get_financial_metrics", output)),
            Err(e) => Ok(ToolResult::failure("get_financial_metrics", e.to_string())),
        }
    }
}

pub struct CompanyInfoTool {
    cache: Arc<MarketDataCache>,
}

impl CompanyInfoTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str) -> Result<String> {
        let profile = self.cache.profile(ticker).await?;
        Ok(describe(&profile))
    }
}

fn describe(profile: &CompanyProfile) -> String {
    let mut output = format!(
        "{} ({})\n",
        profile.name.as_deref().unwrap_or("Unknown company"),
        profile.ticker
    );
    output.push_str(&format!(
        "  Sector: {}\n",
        profile.sector.as_deref().unwrap_or("n/a")
    ));
    output.push_str(&format!(
        "  Industry: {}\n",
        profile.industry.as_deref().unwrap_or("n/a")
    ));
    match (profile.current_price, profile.fifty_two_week_low, profile.fifty_two_week_high) {
        (Some(price), Some(low), Some(high)) => {
            output.push_str(&format!(
                "  Price: ${price:.2} (52-week range ${low:.2} to ${high:.2})\n"
            ));
        }
        (Some(price), _, _) => {
            output.push_str(&format!("  Price: ${price:.2}\n"));
        }
        _ => {}
    }
    if let Some(summary) = &profile.summary {
        output.push_str(&format!("  {summary}\n"));
    }
    output.trim_end().to_string()
}

#[async_trait]
impl Tool for CompanyInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_company_info".into(),
            description: "Company overview: name, sector, industry, current price, and business summary.".into(),
            parameters: vec![ticker_param()],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();

        match self.report(ticker).await {
            Ok(output) => Ok(ToolResult::success("get_company_info", output)),
            Err(e) => Ok(ToolResult::failure("get_company_info", e.to_string())),
        }
    }
}
