//! Multi-factor scoring, recommendation and narrative.
//!
//! Turns indicators, historical performance, valuation and fundamentals into five
//! sub-scores, a weighted composite and a recommendation, then explains the result.

pub mod narrative;
pub mod recommendation;
pub mod scoring;

#[cfg(test)]
mod narrative_tests;

pub use narrative::*;
pub use recommendation::*;
pub use scoring::*;

use analysis_core::{FundamentalsSnapshot, Metric, RecommendationThresholds, ScoreWeights};
use fundamental_analysis::{MacroProfile, ValuationSummary};
use quant_analysis::PerformanceSummary;
use technical_analysis::IndicatorSet;

/// Everything the engine reads for one security
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInputs<'a> {
    pub symbol: &'a str,
    pub current_price: f64,
    pub indicators: &'a IndicatorSet,
    pub performance: &'a PerformanceSummary,
    pub valuation: &'a ValuationSummary,
    pub fundamentals: &'a FundamentalsSnapshot,
    pub macro_profile: &'a MacroProfile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationOutcome {
    pub scores: ScoreSet,
    pub verdict: Verdict,
    pub risk: RiskAssessment,
    pub price_target: Metric<PriceTarget>,
    pub outlook: Metric<LongTermOutlook>,
    pub narrative: Narrative,
}

pub struct RecommendationEngine {
    weights: ScoreWeights,
    thresholds: RecommendationThresholds,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(ScoreWeights::default(), RecommendationThresholds::default())
    }
}

impl RecommendationEngine {
    pub fn new(weights: ScoreWeights, thresholds: RecommendationThresholds) -> Self {
        Self { weights, thresholds }
    }

    /// Composite, recommendation and confidence for an existing score set.
    pub fn verdict(&self, scores: &ScoreSet) -> Verdict {
        Verdict::from_scores(scores, &self.weights, &self.thresholds)
    }

    pub fn evaluate(&self, inputs: &RecommendationInputs<'_>) -> RecommendationOutcome {
        let scores = score_all(&ScoreInputs {
            indicators: inputs.indicators,
            performance: inputs.performance,
            valuation: inputs.valuation,
            fundamentals: inputs.fundamentals,
        });
        let verdict = self.verdict(&scores);

        let risk_level = risk_level(inputs.indicators.volatility, inputs.fundamentals.beta);
        let outlook = verdict.composite.map(LongTermOutlook::from_composite);
        let price_target = price_target(
            inputs.current_price,
            inputs.fundamentals.target_mean_price,
            verdict.composite,
        );

        let ctx = NarrativeContext {
            symbol: inputs.symbol,
            current_price: inputs.current_price,
            indicators: inputs.indicators,
            performance: inputs.performance,
            valuation: inputs.valuation,
            fundamentals: inputs.fundamentals,
            macro_profile: inputs.macro_profile,
            scores: &scores,
            verdict: &verdict,
            risk_level,
            outlook,
            price_target,
        };
        let signals = evaluate_rules(&ctx);

        let risk = risk_assessment(
            risk_level,
            &scores,
            RiskFactors {
                risk_factor_count: signals.risk_factors.len(),
                recession_resilience: inputs.macro_profile.recession_resilience,
                beta: inputs.fundamentals.beta,
            },
        );
        let narrative = compose(&ctx, signals, &risk);

        tracing::debug!(
            "{}: {} sub-scores available, composite {:?}",
            inputs.symbol,
            scores.available_count(),
            verdict.composite.get()
        );

        RecommendationOutcome {
            scores,
            verdict,
            risk,
            price_target,
            outlook,
            narrative,
        }
    }
}
