//! Risk Metrics
//!
//! Annualized volatility, Sharpe ratio and maximum drawdown over a
//! trailing window of daily returns.

use serde::Serialize;

use crate::error::{AnalystError, Result};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annual risk-free rate used for the Sharpe excess return
pub const ANNUAL_RISK_FREE_RATE: f64 = 0.04;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct RiskReport {
    /// Daily stdev scaled by sqrt(252)
    pub annualized_volatility: f64,
    /// Mean excess daily return over daily stdev, scaled by sqrt(252)
    pub sharpe_ratio: f64,
    /// Most negative close / running-max-close - 1; always <= 0
    pub max_drawdown: f64,
}

pub fn risk_metrics(closes: &[f64]) -> Result<RiskReport> {
    // Sample stdev needs at least two returns
    if closes.len() < 3 {
        return Err(AnalystError::InsufficientHistory {
            needed: 3,
            got: closes.len(),
        });
    }

    let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stdev = variance.sqrt();

    let daily_rf = ANNUAL_RISK_FREE_RATE / TRADING_DAYS_PER_YEAR;
    let sharpe_ratio = if stdev == 0.0 {
        0.0
    } else {
        (mean - daily_rf) / stdev * TRADING_DAYS_PER_YEAR.sqrt()
    };

    let mut running_max = f64::MIN;
    let mut max_drawdown = 0.0_f64;
    for &close in closes {
        running_max = running_max.max(close);
        max_drawdown = max_drawdown.min(close / running_max - 1.0);
    }

    Ok(RiskReport {
        annualized_volatility: stdev * TRADING_DAYS_PER_YEAR.sqrt(),
        sharpe_ratio,
        max_drawdown,
    })
}
