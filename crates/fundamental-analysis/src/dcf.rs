//! Discounted cash flow valuation.
//!
//! Free cash flow is grown at `growth_rate` for `projection_years`, each year is
//! discounted at `discount_rate`, and a Gordon-growth terminal value is added on the
//! final year's cash flow. The perpetuity formula is only defined for
//! `discount_rate > terminal_growth_rate`; anything else is `ValuationUndefined`.

use analysis_core::{AnalysisError, DcfConfig, FundamentalsSnapshot, Metric};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfInputs {
    pub free_cash_flow: f64,
    pub shares_outstanding: f64,
    pub growth_rate: f64,
    pub discount_rate: f64,
    pub terminal_growth_rate: f64,
    pub projection_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfOutput {
    pub pv_cash_flows: f64,
    pub terminal_value: f64,
    pub pv_terminal_value: f64,
    pub enterprise_value: f64,
    pub intrinsic_value_per_share: f64,
}

/// Rates the model ran with, and where the growth figure came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    pub growth_rate: f64,
    pub growth_source: GrowthSource,
    pub discount_rate: f64,
    pub beta: f64,
    pub terminal_growth_rate: f64,
    pub projection_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthSource {
    /// The snapshot's own growth estimate
    Estimate,
    /// Clamped mean of revenue and earnings growth
    HistoricalBlend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub intrinsic_value: f64,
    pub enterprise_value: f64,
    pub pv_cash_flows: f64,
    pub pv_terminal_value: f64,
    /// `(intrinsic / price - 1) * 100`
    pub upside_pct: Metric<f64>,
    pub assumptions: DcfAssumptions,
}

impl DcfAssumptions {
    /// Pick growth, discount and terminal rates for a snapshot.
    pub fn resolve(fundamentals: &FundamentalsSnapshot, config: &DcfConfig) -> Self {
        let (growth_rate, growth_source) = match fundamentals.growth_rate_estimate {
            Metric::Available(g) => (g, GrowthSource::Estimate),
            Metric::Unavailable => {
                let revenue = fundamentals.revenue_growth.unwrap_or(config.default_growth);
                let earnings = fundamentals.earnings_growth.unwrap_or(config.default_growth);
                let blended = ((revenue + earnings) / 2.0).clamp(config.min_growth, config.max_growth);
                (blended, GrowthSource::HistoricalBlend)
            }
        };

        let beta = fundamentals.beta.unwrap_or(config.default_beta);

        Self {
            growth_rate,
            growth_source,
            discount_rate: config.risk_free_rate + beta * config.equity_risk_premium,
            beta,
            terminal_growth_rate: config.terminal_growth_rate,
            projection_years: config.projection_years,
        }
    }
}

/// Run the projection. Fails when the inputs cannot produce a meaningful value.
pub fn discounted_cash_flow(inputs: &DcfInputs) -> Result<DcfOutput, AnalysisError> {
    let DcfInputs {
        free_cash_flow: fcf,
        shares_outstanding: shares,
        growth_rate: g,
        discount_rate: r,
        terminal_growth_rate: g_t,
        projection_years: years,
    } = *inputs;

    if [fcf, shares, g, r, g_t].iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::ValuationUndefined("non-finite DCF input".to_string()));
    }
    if fcf <= 0.0 {
        return Err(AnalysisError::ValuationUndefined(format!(
            "free cash flow {} is not positive",
            fcf
        )));
    }
    if shares <= 0.0 {
        return Err(AnalysisError::ValuationUndefined(format!(
            "shares outstanding {} is not positive",
            shares
        )));
    }
    if years == 0 {
        return Err(AnalysisError::ValuationUndefined("projection_years is zero".to_string()));
    }
    if r <= g_t {
        return Err(AnalysisError::ValuationUndefined(format!(
            "discount rate {:.4} does not exceed terminal growth {:.4}",
            r, g_t
        )));
    }
    if r <= -1.0 || g <= -1.0 {
        return Err(AnalysisError::ValuationUndefined("rate at or below -100%".to_string()));
    }

    let mut projected = fcf;
    let mut pv_cash_flows = 0.0;
    for year in 1..=years as i32 {
        projected *= 1.0 + g;
        pv_cash_flows += projected / (1.0 + r).powi(year);
    }

    let terminal_value = projected * (1.0 + g_t) / (r - g_t);
    let pv_terminal_value = terminal_value / (1.0 + r).powi(years as i32);
    let enterprise_value = pv_cash_flows + pv_terminal_value;
    let intrinsic_value_per_share = enterprise_value / shares;

    if !intrinsic_value_per_share.is_finite() || intrinsic_value_per_share <= 0.0 {
        return Err(AnalysisError::ValuationUndefined(format!(
            "intrinsic value {} is not a positive number",
            intrinsic_value_per_share
        )));
    }

    Ok(DcfOutput {
        pv_cash_flows,
        terminal_value,
        pv_terminal_value,
        enterprise_value,
        intrinsic_value_per_share,
    })
}

/// Value a snapshot with resolved assumptions and compare against `current_price`.
pub fn value_fundamentals(
    fundamentals: &FundamentalsSnapshot,
    current_price: f64,
    config: &DcfConfig,
) -> Result<DcfValuation, AnalysisError> {
    let free_cash_flow = fundamentals.free_cash_flow.get().ok_or_else(|| {
        AnalysisError::InsufficientData("free cash flow unavailable".to_string())
    })?;
    let shares_outstanding = fundamentals.shares_outstanding.get().ok_or_else(|| {
        AnalysisError::InsufficientData("shares outstanding unavailable".to_string())
    })?;

    let assumptions = DcfAssumptions::resolve(fundamentals, config);
    let output = discounted_cash_flow(&DcfInputs {
        free_cash_flow,
        shares_outstanding,
        growth_rate: assumptions.growth_rate,
        discount_rate: assumptions.discount_rate,
        terminal_growth_rate: assumptions.terminal_growth_rate,
        projection_years: assumptions.projection_years,
    })?;

    let upside_pct = Metric::positive(current_price)
        .map(|price| (output.intrinsic_value_per_share / price - 1.0) * 100.0);

    Ok(DcfValuation {
        intrinsic_value: output.intrinsic_value_per_share,
        enterprise_value: output.enterprise_value,
        pv_cash_flows: output.pv_cash_flows,
        pv_terminal_value: output.pv_terminal_value,
        upside_pct,
        assumptions,
    })
}
