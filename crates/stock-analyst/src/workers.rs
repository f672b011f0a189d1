//! Analyst Team Definitions
//!
//! Wires each specialist worker to its role instruction and tool bundle.
//! Bundles are strict subsets of the full tool set, so a worker can only
//! reason about the capabilities its role grants.

use std::sync::Arc;

use analyst_core::{GenerationOracle, ToolRegistry, Worker, WorkerKind};

use crate::cache::MarketDataCache;
use crate::svckit::{
    BacktestTool, CompanyInfoTool, FetchPriceTool, FinancialMetricsTool, IntrinsicValueTool,
    FreeCashFlowTool, MacdTool, RiskMetricsTool, RsiTool, SmaTool, WebSearchTool,
};

const TECHNICAL_PROMPT: &str = "You are a Technical Analyst. \
Use price and indicator tools to assess trend and momentum for the requested ticker. \
Report the latest price, moving average posture, RSI reading, and MACD momentum. \
Conclude with a one-line technical outlook.";

const SENTIMENT_PROMPT: &str = "You are a Market Sentiment Analyst. \
Search recent news and commentary for the requested company and summarize the prevailing sentiment. \
Quote or paraphrase the most relevant findings and state whether sentiment is positive, negative, or mixed.";

const FUNDAMENTAL_PROMPT: &str = "You are a Fundamental Analyst. \
Retrieve the company's profile and financial metrics and assess the health of the business: \
profitability, growth, leverage, and valuation multiples. \
Conclude with a one-line fundamental assessment.";

const VALUATION_PROMPT: &str = "You are a Valuation Analyst. \
Estimate what the company is actually worth. \
Use the free cash flow and intrinsic value tools, report the fair value per share and the margin of safety, \
and state whether the stock looks undervalued or overvalued at the current price.";

const QUANT_PROMPT: &str = "You are a Quantitative Analyst. \
Evaluate risk and historical strategy performance for the requested ticker. \
Report annualized volatility, Sharpe ratio, and max drawdown, and backtest a relevant strategy when asked. \
Conclude with a one-line risk summary.";

/// Build one worker with its role prompt and bundle
fn build_worker(
    kind: WorkerKind,
    role_prompt: &str,
    oracle: Arc<dyn GenerationOracle>,
    tools: ToolRegistry,
) -> Worker {
    Worker::new(kind, role_prompt, oracle, Arc::new(tools))
}

/// Assemble the full analyst team against one cache and one oracle chain
pub fn all_workers(
    oracle: Arc<dyn GenerationOracle>,
    cache: Arc<MarketDataCache>,
) -> Vec<Worker> {
    let mut technical = ToolRegistry::new();
    technical.register(FetchPriceTool::new(Arc::clone(&cache)));
    technical.register(SmaTool::new(Arc::clone(&cache)));
    technical.register(RsiTool::new(Arc::clone(&cache)));
    technical.register(MacdTool::new(Arc::clone(&cache)));

    let mut sentiment = ToolRegistry::new();
    sentiment.register(WebSearchTool::new());

    let mut fundamental = ToolRegistry::new();
    fundamental.register(FinancialMetricsTool::new(Arc::clone(&cache)));
    fundamental.register(CompanyInfoTool::new(Arc::clone(&cache)));

    let mut valuation = ToolRegistry::new();
    valuation.register(FreeCashFlowTool::new(Arc::clone(&cache)));
    valuation.register(IntrinsicValueTool::new(Arc::clone(&cache)));

    let mut quant = ToolRegistry::new();
    quant.register(RiskMetricsTool::new(Arc::clone(&cache)));
    quant.register(BacktestTool::new(Arc::clone(&cache)));

    vec![
        build_worker(WorkerKind::Technical, TECHNICAL_PROMPT, Arc::clone(&oracle), technical),
        build_worker(WorkerKind::Sentiment, SENTIMENT_PROMPT, Arc::clone(&oracle), sentiment),
        build_worker(WorkerKind::Fundamental, FUNDAMENTAL_PROMPT, Arc::clone(&oracle), fundamental),
        build_worker(WorkerKind::Valuation, VALUATION_PROMPT, Arc::clone(&oracle), valuation),
        build_worker(WorkerKind::Quant, QUANT_PROMPT, oracle, quant),
    ]
}
