//! Price Fetch Tool
//!
//! Returns the latest close, or a tail of recent closes, for a ticker.

use std::sync::Arc;

use async_trait::async_trait;

use analyst_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::cache::MarketDataCache;
use crate::error::{AnalystError, Result};

pub struct FetchPriceTool {
    cache: Arc<MarketDataCache>,
}

impl FetchPriceTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str, days: u32) -> Result<String> {
        let series = self.cache.series(ticker, days).await?;
        if series.is_empty() {
            return Err(AnalystError::DataUnavailable {
                ticker: ticker.to_uppercase(),
            });
        }

        let last = series.last().map(|c| (c.date, c.close));
        let mut output = String::new();
        if let Some((date, close)) = last {
            output.push_str(&format!(
                "{} last close: ${close:.2} ({date})\n",
                ticker.to_uppercase()
            ));
        }

        if days > 1 {
            output.push_str("Recent closes:\n");
            for candle in series.candles().iter().rev().take(days as usize).rev() {
                output.push_str(&format!("  {}: ${:.2}\n", candle.date, candle.close));
            }
        }

        Ok(output.trim_end().to_string())
    }
}

#[async_trait]
impl Tool for FetchPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "fetch_price".into(),
            description: "Get the latest closing price for a stock ticker, optionally with a tail of recent daily closes.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "ticker".into(),
                    param_type: "string".into(),
                    description: "Stock ticker symbol (e.g., 'AAPL')".into(),
                    required: true,
                    default: None,
                },
                ParameterSchema {
                    name: "days".into(),
                    param_type: "number".into(),
                    description: "Number of trailing daily closes to include".into(),
                    required: false,
                    default: Some(serde_json::json!(1)),
                },
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();
        let days = call.f64_arg("days").map_or(1, |d| d.max(1.0) as u32);

        match self.report(ticker, days).await {
            Ok(output) => Ok(ToolResult::success("fetch_price", output)),
            Err(e) => Ok(ToolResult::failure("fetch_price", e.to_string())),
        }
    }
}
