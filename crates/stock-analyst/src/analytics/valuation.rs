//! DCF Valuation
//!
//! Five-year discounted-cash-flow model with a CAPM discount rate and a
//! Gordon-growth terminal value. All assumptions are systematic; the only
//! company-specific inputs come from the fundamentals profile.

use serde::Serialize;

use crate::error::{AnalystError, Result};
use crate::model::CompanyProfile;

/// CAPM inputs
pub const DCF_RISK_FREE_RATE: f64 = 0.042;
pub const EQUITY_RISK_PREMIUM: f64 = 0.05;
/// Market beta assumed when the profile omits one
pub const DEFAULT_BETA: f64 = 1.0;

/// Growth-rate policy applied to the analyst revenue-growth estimate
pub const MAX_GROWTH_RATE: f64 = 0.15;
pub const MIN_GROWTH_RATE: f64 = 0.02;
pub const DEFAULT_GROWTH_RATE: f64 = 0.05;

pub const TERMINAL_GROWTH_RATE: f64 = 0.03;
pub const PROJECTION_YEARS: u32 = 5;

/// DCF output
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DcfValuation {
    pub discount_rate: f64,
    pub growth_rate: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub fair_value_per_share: f64,
    pub current_price: f64,
    /// (1 - price / fair value) x 100; negative means overvalued
    pub margin_of_safety_pct: f64,
}

/// Trailing free cash flow: prefer the reported figure, otherwise derive
/// it from operating cash flow plus (conventionally negative) capex.
pub fn free_cash_flow(profile: &CompanyProfile) -> Result<f64> {
    if let Some(fcf) = profile.free_cash_flow {
        return Ok(fcf);
    }
    match (profile.operating_cash_flow, profile.capital_expenditure) {
        (Some(ocf), Some(capex)) => Ok(ocf + capex),
        _ => Err(AnalystError::UndefinedValuation(format!(
            "{}: neither free cash flow nor operating cash flow is reported",
            profile.ticker
        ))),
    }
}

/// CAPM: risk-free rate plus beta times the equity risk premium
pub fn capm_discount_rate(beta: Option<f64>) -> f64 {
    DCF_RISK_FREE_RATE + beta.unwrap_or(DEFAULT_BETA) * EQUITY_RISK_PREMIUM
}

/// Clamp the revenue-growth estimate into the model's policy band
pub fn projected_growth_rate(estimate: Option<f64>) -> f64 {
    match estimate {
        None => DEFAULT_GROWTH_RATE,
        Some(g) if g < 0.0 => MIN_GROWTH_RATE,
        Some(g) => g.min(MAX_GROWTH_RATE),
    }
}

/// Present value of five projected cash flows plus the discounted
/// terminal value. Undefined when the discount rate does not exceed the
/// terminal growth rate.
pub fn enterprise_value(fcf: f64, growth_rate: f64, discount_rate: f64) -> Result<f64> {
    if discount_rate <= TERMINAL_GROWTH_RATE {
        return Err(AnalystError::UndefinedValuation(format!(
            "discount rate {:.4} must exceed terminal growth {:.4}",
            discount_rate, TERMINAL_GROWTH_RATE
        )));
    }

    let mut value = 0.0;
    let mut projected = fcf;
    for year in 1..=PROJECTION_YEARS {
        projected *= 1.0 + growth_rate;
        value += projected / (1.0 + discount_rate).powi(year as i32);
    }

    let terminal =
        projected * (1.0 + TERMINAL_GROWTH_RATE) / (discount_rate - TERMINAL_GROWTH_RATE);
    value += terminal / (1.0 + discount_rate).powi(PROJECTION_YEARS as i32);

    Ok(value)
}

/// Full intrinsic-value model over a fundamentals profile
pub fn intrinsic_value(profile: &CompanyProfile) -> Result<DcfValuation> {
    let current_price = profile.current_price.ok_or_else(|| {
        AnalystError::UndefinedValuation(format!("{}: current price unavailable", profile.ticker))
    })?;
    let shares = profile
        .shares_outstanding
        .filter(|s| *s > 0.0)
        .ok_or_else(|| {
            AnalystError::UndefinedValuation(format!(
                "{}: shares outstanding unavailable",
                profile.ticker
            ))
        })?;

    let fcf = free_cash_flow(profile)?;
    let discount_rate = capm_discount_rate(profile.beta);
    let growth_rate = projected_growth_rate(profile.revenue_growth);

    let ev = enterprise_value(fcf, growth_rate, discount_rate)?;

    // Enterprise-to-equity bridge: net cash approximation
    let cash = profile.total_cash.unwrap_or(0.0);
    let debt = profile.total_debt.unwrap_or(0.0);
    let equity_value = ev + cash - debt;

    let fair_value_per_share = equity_value / shares;
    let margin_of_safety_pct = (1.0 - current_price / fair_value_per_share) * 100.0;

    Ok(DcfValuation {
        discount_rate,
        growth_rate,
        enterprise_value: ev,
        equity_value,
        fair_value_per_share,
        current_price,
        margin_of_safety_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CompanyProfile {
        CompanyProfile {
            ticker: "TEST".into(),
            beta: Some(1.0),
            revenue_growth: Some(0.08),
            shares_outstanding: Some(1.0e9),
            total_cash: Some(10.0e9),
            total_debt: Some(5.0e9),
            free_cash_flow: Some(8.0e9),
            current_price: Some(90.0),
            ..CompanyProfile::empty("TEST")
        }
    }

    #[test]
    fn test_fcf_prefers_reported_figure() {
        let mut p = profile();
        p.operating_cash_flow = Some(100.0e9);
        p.capital_expenditure = Some(-20.0e9);
        assert_eq!(free_cash_flow(&p).unwrap(), 8.0e9);
    }

    #[test]
    fn test_fcf_derived_from_ocf_plus_capex() {
        let mut p = profile();
        p.free_cash_flow = None;
        p.operating_cash_flow = Some(100.0e9);
        p.capital_expenditure = Some(-20.0e9);
        // Capex is signed negative, so addition subtracts the expenditure
        assert_eq!(free_cash_flow(&p).unwrap(), 80.0e9);
    }

    #[test]
    fn test_fcf_missing_everything_fails() {
        let p = CompanyProfile::empty("X");
        assert!(matches!(
            free_cash_flow(&p).unwrap_err(),
            AnalystError::UndefinedValuation(_)
        ));
    }

    #[test]
    fn test_growth_rate_policy() {
        assert_eq!(projected_growth_rate(None), DEFAULT_GROWTH_RATE);
        assert_eq!(projected_growth_rate(Some(-0.10)), MIN_GROWTH_RATE);
        assert_eq!(projected_growth_rate(Some(0.40)), MAX_GROWTH_RATE);
        assert_eq!(projected_growth_rate(Some(0.07)), 0.07);
    }

    #[test]
    fn test_terminal_value_guard() {
        // Discount rate equal to terminal growth must fail, not divide
        let err = enterprise_value(1.0e9, 0.05, TERMINAL_GROWTH_RATE).unwrap_err();
        assert!(matches!(err, AnalystError::UndefinedValuation(_)));

        let err = enterprise_value(1.0e9, 0.05, 0.01).unwrap_err();
        assert!(matches!(err, AnalystError::UndefinedValuation(_)));
    }

    #[test]
    fn test_enterprise_value_hand_check() {
        // One dollar of FCF, zero growth: five discounted dollars plus
        // the discounted terminal value
        let discount = 0.10;
        let ev = enterprise_value(1.0, 0.0, discount).unwrap();

        let mut expected = 0.0;
        for year in 1..=5 {
            expected += 1.0 / (1.0 + discount).powi(year);
        }
        expected += (1.0 * 1.03 / (discount - 0.03)) / (1.0 + discount).powi(5);

        assert!((ev - expected).abs() < 1e-12);
    }

    #[test]
    fn test_intrinsic_value_requires_price_and_shares() {
        let mut p = profile();
        p.current_price = None;
        assert!(intrinsic_value(&p).is_err());

        let mut p = profile();
        p.shares_outstanding = None;
        assert!(intrinsic_value(&p).is_err());
    }

    #[test]
    fn test_margin_of_safety_sign_convention() {
        let v = intrinsic_value(&profile()).unwrap();
        let recomputed = (1.0 - v.current_price / v.fair_value_per_share) * 100.0;
        assert!((v.margin_of_safety_pct - recomputed).abs() < 1e-9);

        // Undervalued when price is below fair value
        if v.current_price < v.fair_value_per_share {
            assert!(v.margin_of_safety_pct > 0.0);
        }
    }
}
