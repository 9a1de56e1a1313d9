use analysis_core::{Metric, Recommendation, RecommendationThresholds, ScoreWeights};
use fundamental_analysis::Exposure;
use serde::{Deserialize, Serialize};

use crate::scoring::{composite, ScoreSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    pub fn to_label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Moderate => "Moderate",
            ConfidenceLevel::Low => "Low",
        }
    }
}

/// Share of the five sub-scores that could be computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// 0.0 to 1.0
    pub value: f64,
    pub level: ConfidenceLevel,
}

impl Confidence {
    pub fn from_scores(scores: &ScoreSet) -> Self {
        let value = scores.available_count() as f64 / 5.0;
        let level = if value >= 0.8 {
            ConfidenceLevel::High
        } else if value >= 0.6 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        };
        Self { value, level }
    }
}

/// Composite, recommendation and confidence. A pure function of a [`ScoreSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub composite: Metric<f64>,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
}

impl Verdict {
    pub fn from_scores(scores: &ScoreSet, weights: &ScoreWeights, thresholds: &RecommendationThresholds) -> Self {
        let composite = composite(scores, weights);
        let recommendation = composite
            .map(|c| Recommendation::from_composite(c, thresholds))
            .unwrap_or(Recommendation::Hold);

        Self {
            composite,
            recommendation,
            confidence: Confidence::from_scores(scores),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn to_label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }

    fn from_points(points: i32) -> Self {
        match points.clamp(0, 3) {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            2 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }
}

/// Risk level from annualized volatility (a fraction) and beta.
///
/// Without volatility the level starts from Medium and only the beta adjustment
/// applies.
pub fn risk_level(volatility: Metric<f64>, beta: Metric<f64>) -> Metric<RiskLevel> {
    if volatility.is_unavailable() && beta.is_unavailable() {
        return Metric::Unavailable;
    }

    let base = match volatility.get() {
        Some(v) if v < 0.15 => 0,
        Some(v) if v < 0.25 => 1,
        Some(v) if v < 0.40 => 2,
        Some(_) => 3,
        None => 1,
    };
    let adjustment = match beta.get() {
        Some(b) if b > 1.5 => 1,
        Some(b) if b < 0.7 => -1,
        _ => 0,
    };

    Metric::Available(RiskLevel::from_points(base + adjustment))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: Metric<RiskLevel>,
    /// 0 to 100, higher is riskier
    pub score: u8,
    pub reasoning: Vec<String>,
}

/// Inputs to the risk score that come from elsewhere in the report
#[derive(Debug, Clone, Copy)]
pub struct RiskFactors {
    pub risk_factor_count: usize,
    pub recession_resilience: Exposure,
    pub beta: Metric<f64>,
}

pub fn risk_assessment(level: Metric<RiskLevel>, scores: &ScoreSet, factors: RiskFactors) -> RiskAssessment {
    let mut score: u32 = 0;
    let mut reasoning = Vec::new();

    if factors.risk_factor_count > 5 {
        score += 20;
        reasoning.push(format!("High number of risk factors ({})", factors.risk_factor_count));
    } else if factors.risk_factor_count > 3 {
        score += 10;
        reasoning.push(format!("Moderate number of risk factors ({})", factors.risk_factor_count));
    }

    if let Some(s) = scores.fundamental.get().filter(|s| *s < 40) {
        score += 15;
        reasoning.push(format!("Weak fundamentals (score {}/100)", s));
    }
    if let Some(s) = scores.technical.get().filter(|s| *s < 40) {
        score += 10;
        reasoning.push(format!("Negative technical indicators (score {}/100)", s));
    }

    if factors.recession_resilience == Exposure::Low {
        score += 10;
        reasoning.push("Low recession resilience".to_string());
    }
    if let Some(b) = factors.beta.get().filter(|b| *b > 1.5) {
        score += 10;
        reasoning.push(format!("High market sensitivity (beta {:.2})", b));
    }

    RiskAssessment {
        level,
        score: score.min(100) as u8,
        reasoning,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTargetSource {
    /// Analyst consensus mean target
    AnalystMean,
    /// Current price scaled by the composite band
    CompositeImplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTarget {
    pub value: f64,
    pub source: PriceTargetSource,
    pub upside_pct: f64,
}

pub fn price_target(current_price: f64, analyst_mean: Metric<f64>, composite: Metric<f64>) -> Metric<PriceTarget> {
    if current_price <= 0.0 {
        return Metric::Unavailable;
    }

    let (value, source) = match (analyst_mean.filter(|t| *t > 0.0), composite) {
        (Metric::Available(target), _) => (target, PriceTargetSource::AnalystMean),
        (Metric::Unavailable, Metric::Available(c)) => {
            let multiplier = match c {
                c if c >= 65.0 => 1.15,
                c if c >= 55.0 => 1.05,
                c if c >= 45.0 => 0.95,
                _ => 0.85,
            };
            (current_price * multiplier, PriceTargetSource::CompositeImplied)
        }
        (Metric::Unavailable, Metric::Unavailable) => return Metric::Unavailable,
    };

    Metric::Available(PriceTarget {
        value,
        source,
        upside_pct: (value / current_price - 1.0) * 100.0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LongTermOutlook {
    VeryPositive,
    Positive,
    Neutral,
    Cautious,
    Negative,
}

impl LongTermOutlook {
    pub fn from_composite(composite: f64) -> Self {
        match composite {
            c if c >= 75.0 => LongTermOutlook::VeryPositive,
            c if c >= 65.0 => LongTermOutlook::Positive,
            c if c >= 55.0 => LongTermOutlook::Neutral,
            c if c >= 45.0 => LongTermOutlook::Cautious,
            _ => LongTermOutlook::Negative,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            LongTermOutlook::VeryPositive => "Very Positive",
            LongTermOutlook::Positive => "Positive",
            LongTermOutlook::Neutral => "Neutral",
            LongTermOutlook::Cautious => "Cautious",
            LongTermOutlook::Negative => "Negative",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scores(values: [Option<u8>; 5]) -> ScoreSet {
        let [technical, fundamental, momentum, value, growth] = values.map(Metric::from);
        ScoreSet { technical, fundamental, momentum, value, growth }
    }

    #[test]
    fn test_no_scores_is_hold_with_zero_confidence() {
        let v = Verdict::from_scores(
            &ScoreSet::default(),
            &ScoreWeights::default(),
            &RecommendationThresholds::default(),
        );
        assert!(v.composite.is_unavailable());
        assert_eq!(v.recommendation, Recommendation::Hold);
        assert_relative_eq!(v.confidence.value, 0.0);
        assert_eq!(v.confidence.level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_verdict_is_idempotent() {
        let s = scores([Some(82), Some(71), None, Some(64), Some(90)]);
        let weights = ScoreWeights::default();
        let thresholds = RecommendationThresholds::default();
        let first = Verdict::from_scores(&s, &weights, &thresholds);
        let second = Verdict::from_scores(&s, &weights, &thresholds);
        assert_eq!(first, second);
        assert_eq!(first.confidence.level, ConfidenceLevel::High);
    }

    #[test]
    fn test_confidence_levels() {
        assert_eq!(Confidence::from_scores(&scores([Some(1), Some(1), Some(1), None, None])).level, ConfidenceLevel::Moderate);
        assert_eq!(Confidence::from_scores(&scores([Some(1), Some(1), None, None, None])).level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_risk_level() {
        assert_eq!(risk_level(Metric::Available(0.10), Metric::Unavailable), Metric::Available(RiskLevel::Low));
        assert_eq!(risk_level(Metric::Available(0.30), Metric::Available(1.0)), Metric::Available(RiskLevel::High));
        assert_eq!(risk_level(Metric::Available(0.50), Metric::Available(2.0)), Metric::Available(RiskLevel::VeryHigh));
        assert_eq!(risk_level(Metric::Available(0.10), Metric::Available(0.5)), Metric::Available(RiskLevel::Low));
        assert_eq!(risk_level(Metric::Available(0.20), Metric::Available(0.5)), Metric::Available(RiskLevel::Low));
        assert_eq!(risk_level(Metric::Unavailable, Metric::Available(1.8)), Metric::Available(RiskLevel::High));
        assert!(risk_level(Metric::Unavailable, Metric::Unavailable).is_unavailable());
    }

    #[test]
    fn test_risk_score_accumulates() {
        let s = scores([Some(30), Some(35), None, None, None]);
        let risk = risk_assessment(
            Metric::Available(RiskLevel::High),
            &s,
            RiskFactors {
                risk_factor_count: 6,
                recession_resilience: Exposure::Low,
                beta: Metric::Available(1.9),
            },
        );
        assert_eq!(risk.score, 65);
        assert_eq!(risk.reasoning.len(), 5);

        let calm = risk_assessment(
            Metric::Unavailable,
            &scores([Some(70); 5]),
            RiskFactors {
                risk_factor_count: 1,
                recession_resilience: Exposure::High,
                beta: Metric::Unavailable,
            },
        );
        assert_eq!(calm.score, 0);
        assert!(calm.reasoning.is_empty());
    }

    #[test]
    fn test_price_target_prefers_analysts() {
        let t = price_target(100.0, Metric::Available(130.0), Metric::Available(40.0)).value().copied().unwrap();
        assert_eq!(t.source, PriceTargetSource::AnalystMean);
        assert_relative_eq!(t.upside_pct, 30.0, epsilon = 1e-9);

        let t = price_target(100.0, Metric::Unavailable, Metric::Available(70.0)).value().copied().unwrap();
        assert_eq!(t.source, PriceTargetSource::CompositeImplied);
        assert_relative_eq!(t.value, 115.0, epsilon = 1e-9);

        let t = price_target(100.0, Metric::Unavailable, Metric::Available(30.0)).value().copied().unwrap();
        assert_relative_eq!(t.value, 85.0, epsilon = 1e-9);

        assert!(price_target(100.0, Metric::Unavailable, Metric::Unavailable).is_unavailable());
        assert!(price_target(0.0, Metric::Available(10.0), Metric::Available(70.0)).is_unavailable());
    }

    #[test]
    fn test_outlook_bands() {
        assert_eq!(LongTermOutlook::from_composite(75.0), LongTermOutlook::VeryPositive);
        assert_eq!(LongTermOutlook::from_composite(64.9), LongTermOutlook::Neutral);
        assert_eq!(LongTermOutlook::from_composite(10.0), LongTermOutlook::Negative);
    }
}
