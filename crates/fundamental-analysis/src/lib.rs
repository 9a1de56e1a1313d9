pub mod dcf;
pub mod macro_profile;
pub mod relative;

pub use dcf::*;
pub use macro_profile::*;
pub use relative::*;

use analysis_core::{DcfConfig, FundamentalsSnapshot, Metric, ValuationBands};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub dcf: Metric<DcfValuation>,
    pub relative: Metric<RelativeValuation>,
    /// Analyst mean target vs current price, in percent
    pub analyst_upside_pct: Metric<f64>,
}

/// Runs the DCF and relative models. Failures degrade to `Unavailable`.
pub struct ValuationEngine {
    dcf: DcfConfig,
    bands: ValuationBands,
}

impl ValuationEngine {
    pub fn new(dcf: DcfConfig, bands: ValuationBands) -> Self {
        Self { dcf, bands }
    }

    pub fn evaluate(&self, fundamentals: &FundamentalsSnapshot, current_price: f64) -> ValuationSummary {
        let dcf = match value_fundamentals(fundamentals, current_price, &self.dcf) {
            Ok(valuation) => Metric::Available(valuation),
            Err(e) => {
                tracing::debug!("DCF unavailable: {}", e);
                Metric::Unavailable
            }
        };

        let relative = relative_valuation(fundamentals, current_price, &self.bands);
        if relative.is_unavailable() {
            tracing::debug!("Relative valuation unavailable: no usable P/E, P/B or P/S");
        }

        let analyst_upside_pct = match (fundamentals.target_mean_price, Metric::positive(current_price)) {
            (Metric::Available(target), Metric::Available(price)) if target > 0.0 => {
                Metric::Available((target / price - 1.0) * 100.0)
            }
            _ => Metric::Unavailable,
        };

        ValuationSummary {
            dcf,
            relative,
            analyst_upside_pct,
        }
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new(DcfConfig::default(), ValuationBands::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_snapshot_degrades() {
        let summary = ValuationEngine::default().evaluate(&FundamentalsSnapshot::default(), 100.0);
        assert!(summary.dcf.is_unavailable());
        assert!(summary.relative.is_unavailable());
        assert!(summary.analyst_upside_pct.is_unavailable());
    }

    #[test]
    fn test_undefined_dcf_keeps_relative() {
        let mut config = DcfConfig::default();
        config.terminal_growth_rate = 0.10;
        let engine = ValuationEngine::new(config, ValuationBands::default());

        let f = FundamentalsSnapshot {
            free_cash_flow: Metric::Available(1.0e9),
            shares_outstanding: Metric::Available(1.0e8),
            trailing_pe: Metric::Available(18.0),
            target_mean_price: Metric::Available(110.0),
            ..Default::default()
        };
        let summary = engine.evaluate(&f, 100.0);

        assert!(summary.dcf.is_unavailable());
        assert!(summary.relative.is_available());
        assert_relative_eq!(summary.analyst_upside_pct.get().unwrap(), 10.0, epsilon = 1e-9);
    }
}
