//! Error Types for Stock Analytics

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalystError>;

/// Analytics-level failures. All of these are recovered at the tool
/// boundary and handed to the oracle as descriptive text, never thrown
/// through the orchestration layer.
#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("No price data available for {ticker}")]
    DataUnavailable { ticker: String },

    #[error("Insufficient history: need at least {needed} samples, have {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("Valuation undefined: {0}")]
    UndefinedValuation(String),

    #[error("Unknown strategy: {0} (supported: 'sma_crossover', 'rsi_mean_reversion')")]
    UnknownStrategy(String),

    #[error("Market data provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
