//! Technical Indicator Tools
//!
//! SMA, RSI, and MACD over a year of daily closes.

use std::sync::Arc;

use async_trait::async_trait;

use analyst_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::analytics::{macd, rsi, sma};
use crate::cache::MarketDataCache;
use crate::error::{AnalystError, Result};
use crate::svckit::ANALYSIS_LOOKBACK_DAYS;

const DEFAULT_SMA_WINDOW: usize = 20;
const DEFAULT_RSI_WINDOW: usize = 14;

async fn closes(cache: &MarketDataCache, ticker: &str) -> Result<Vec<f64>> {
    let series = cache.series(ticker, ANALYSIS_LOOKBACK_DAYS).await?;
    if series.is_empty() {
        return Err(AnalystError::DataUnavailable {
            ticker: ticker.to_uppercase(),
        });
    }
    Ok(series.closes())
}

pub struct SmaTool {
    cache: Arc<MarketDataCache>,
}

impl SmaTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str, window: usize) -> Result<String> {
        let closes = closes(&self.cache, ticker).await?;
        let value = sma(&closes, window)?;
        Ok(format!(
            "{} SMA({window}): ${value:.2}",
            ticker.to_uppercase()
        ))
    }
}

#[async_trait]
impl Tool for SmaTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "sma".into(),
            description: "Simple moving average of daily closes over a window.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "ticker".into(),
                    param_type: "string".into(),
                    description: "Stock ticker symbol".into(),
                    required: true,
                    default: None,
                },
                ParameterSchema {
                    name: "window".into(),
                    param_type: "number".into(),
                    description: "Averaging window in trading days".into(),
                    required: false,
                    default: Some(serde_json::json!(DEFAULT_SMA_WINDOW)),
                },
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();
        let window = call
            .f64_arg("window")
            .map_or(DEFAULT_SMA_WINDOW, |w| w.max(1.0) as usize);

        match self.report(ticker, window).await {
            Ok(output) => Ok(ToolResult::success("sma", output)),
            Err(e) => Ok(ToolResult::failure("sma", e.to_string())),
        }
    }
}

pub struct RsiTool {
    cache: Arc<MarketDataCache>,
}

impl RsiTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str, window: usize) -> Result<String> {
        let closes = closes(&self.cache, ticker).await?;
        let value = rsi(&closes, window)?;
        let reading = if value > 70.0 {
            "overbought"
        } else if value < 30.0 {
            "oversold"
        } else {
            "neutral"
        };
        Ok(format!(
            "{} RSI({window}): {value:.1} ({reading})",
            ticker.to_uppercase()
        ))
    }
}

#[async_trait]
impl Tool for RsiTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "rsi".into(),
            description: "Relative strength index of daily closes. Above 70 is overbought, below 30 is oversold.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "ticker".into(),
                    param_type: "string".into(),
                    description: "Stock ticker symbol".into(),
                    required: true,
                    default: None,
                },
                ParameterSchema {
                    name: "window".into(),
                    param_type: "number".into(),
                    description: "RSI window in trading days".into(),
                    required: false,
                    default: Some(serde_json::json!(DEFAULT_RSI_WINDOW)),
                },
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call.str_arg("ticker").unwrap_or_default();
        let window = call
            .f64_arg("window")
            .map_or(DEFAULT_RSI_WINDOW, |w| w.max(2.0) as usize);

        match self.report(ticker, window).await {
            Ok(output) => Ok(ToolResult::success("rsi", output)),
            Err(e) => Ok(ToolResult::failure("rsi", e.to_string())),
        }
    }
}

pub struct MacdTool {
    cache: Arc<MarketDataCache>,
}

impl MacdTool {
    pub fn new(cache: Arc<MarketDataCache>) -> Self {
        Self { cache }
    }

    async fn report(&self, ticker: &str) -> Result<String> {
        let closes = closes(&self.cache, ticker).await?;
        let value = macd(&closes)?;
        let momentum = if value.histogram > 0.0 { "bullish" } else { "bearish" };
        Ok(format!(
            "{} MACD(12,26,9): line {:.3}, signal {:.3}, histogram {:.3} ({momentum})",
            ticker.to_uppercase(),
            value.line,
            value.signal,
            value.histogram
        ))
    }
}

#[async_trait]
impl Tool for MacdTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "macd".into(),
            description: "MACD with fixed 12/26/9 spans: MACD line, signal line, and histogram.".into(),
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
            Ok(output) => Ok(ToolResult::success("macd", output)),
            Err(e) => Ok(ToolResult::failure("macd", e.to_string())),
        }
    }
}
