//! Price Indicators
//!
//! SMA, Wilder-style RSI and MACD over daily closes.

use crate::error::{AnalystError, Result};

/// MACD spans are fixed by convention and not configurable
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

/// Minimum samples for a meaningful MACD (slow EMA plus signal warm-up)
pub const MACD_MIN_SAMPLES: usize = MACD_SLOW + MACD_SIGNAL;

/// Simple moving average of the last `window` closes
pub fn sma(closes: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(AnalystError::InsufficientHistory { needed: 1, got: 0 });
    }
    if closes.len() < window {
        return Err(AnalystError::InsufficientHistory {
            needed: window,
            got: closes.len(),
        });
    }

    let tail = &closes[closes.len() - window..];
    Ok(tail.iter().sum::<f64>() / window as f64)
}

/// Exponential moving average series, seeded with the first value
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);
    for &value in &values[1..] {
        ema = alpha * value + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

/// Relative Strength Index over the last `window` daily deltas.
///
/// RS is the average positive delta divided by the average negative delta;
/// a window with zero average loss is defined as RSI 100 (the division by
/// zero is guarded, not special-cased downstream).
pub fn rsi(closes: &[f64], window: usize) -> Result<f64> {
    let needed = window + 1;
    if closes.len() < needed {
        return Err(AnalystError::InsufficientHistory {
            needed,
            got: closes.len(),
        });
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in closes.len() - window..closes.len() {
        let delta = closes[i] - closes[i - 1];
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses += -delta;
        }
    }

    let avg_gain = gains / window as f64;
    let avg_loss = losses / window as f64;

    if avg_loss == 0.0 {
        return Ok(100.0);
    }

    let rs = avg_gain / avg_loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

/// MACD snapshot: line, signal and histogram at the latest close
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD(12, 26) with a 9-period signal line
pub fn macd(closes: &[f64]) -> Result<Macd> {
    if closes.len() < MACD_MIN_SAMPLES {
        return Err(AnalystError::InsufficientHistory {
            needed: MACD_MIN_SAMPLES,
            got: closes.len(),
        });
    }

    let fast = ema_series(closes, MACD_FAST);
    let slow = ema_series(closes, MACD_SLOW);
    let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal_line = ema_series(&macd_line, MACD_SIGNAL);

    let line = *macd_line.last().unwrap();
    let signal = *signal_line.last().unwrap();
    Ok(Macd {
        line,
        signal,
        histogram: line - signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_is_mean_of_tail() {
        let closes = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let value = sma(&closes, 3).unwrap();
        assert!((value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_sma_insufficient_history() {
        let closes = vec![1.0, 2.0];
        let err = sma(&closes, 5).unwrap_err();
        assert!(matches!(
            err,
            AnalystError::InsufficientHistory { needed: 5, got: 2 }
        ));
    }

    #[test]
    fn test_rsi_bounds_on_mixed_series() {
        // Alternating up/down closes, all non-negative
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + if i % 2 == 0 { 2.0 } else { -1.0 } * (i as f64 % 5.0))
            .collect();

        for window in [5, 10, 14, 20] {
            let value = rsi(&closes, window).unwrap();
            assert!((0.0..=100.0).contains(&value), "rsi {} out of range", value);
        }
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert!((rsi(&closes, 14).unwrap() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_all_losses_near_zero() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64 * 0.5).collect();
        let value = rsi(&closes, 14).unwrap();
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn test_rsi_needs_window_plus_one() {
        let closes = vec![1.0; 14];
        assert!(matches!(
            rsi(&closes, 14).unwrap_err(),
            AnalystError::InsufficientHistory { needed: 15, .. }
        ));
    }

    #[test]
    fn test_macd_histogram_identity() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect();

        let m = macd(&closes).unwrap();
        assert!((m.histogram - (m.line - m.signal)).abs() < 1e-12);
    }

    #[test]
    fn test_macd_minimum_samples() {
        let closes = vec![100.0; 34];
        assert!(macd(&closes).is_err());
        let closes = vec![100.0; 35];
        assert!(macd(&closes).is_ok());
    }

    #[test]
    fn test_ema_flat_series_is_flat() {
        let values = vec![42.0; 10];
        let ema = ema_series(&values, 5);
        assert!(ema.iter().all(|v| (v - 42.0).abs() < 1e-12));
    }
}
