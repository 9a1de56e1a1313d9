use std::collections::HashSet;

use analysis_core::{
    FundamentalsSnapshot, Metric, PriceBar, PriceSeries, Recommendation, RecommendationThresholds,
    ScoreWeights,
};
use chrono::{Days, NaiveDate};
use fundamental_analysis::{macro_profile, MacroProfile, ValuationEngine, ValuationSummary};
use quant_analysis::{PerformanceAnalyzer, PerformanceSummary};
use technical_analysis::{IndicatorEngine, IndicatorSet, RsiZone};

use crate::narrative::*;
use crate::recommendation::{RiskAssessment, Verdict};
use crate::scoring::ScoreSet;
use crate::{RecommendationEngine, RecommendationInputs};

fn series(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            PriceBar::new(start + Days::new(i as u64), c, c + 1.0, c - 1.0, c, 1_000_000 + (i as u64 % 7) * 10_000)
        })
        .collect();
    PriceSeries::normalize(bars).unwrap()
}

fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64 * 0.5 + (i as f64 / 3.0).sin()).collect()
}

struct Fixture {
    indicators: IndicatorSet,
    performance: PerformanceSummary,
    valuation: ValuationSummary,
    fundamentals: FundamentalsSnapshot,
    macro_profile: MacroProfile,
    scores: ScoreSet,
    verdict: Verdict,
}

impl Fixture {
    fn new(series: &PriceSeries, fundamentals: FundamentalsSnapshot) -> Self {
        let price = series.current_price();
        let macro_profile = macro_profile(
            fundamentals.sector.as_deref(),
            fundamentals.industry.as_deref(),
            fundamentals.beta,
        );
        let scores = ScoreSet::default();
        Self {
            indicators: IndicatorEngine::default().compute(series),
            performance: PerformanceAnalyzer::new().summarize(series),
            valuation: ValuationEngine::default().evaluate(&fundamentals, price),
            fundamentals,
            macro_profile,
            verdict: Verdict::from_scores(&scores, &ScoreWeights::default(), &RecommendationThresholds::default()),
            scores,
        }
    }

    fn blank() -> Self {
        Self::new(&series(&[50.0]), FundamentalsSnapshot::default())
    }

    fn ctx(&self) -> NarrativeContext<'_> {
        NarrativeContext {
            symbol: "TEST",
            current_price: self.indicators.current_price,
            indicators: &self.indicators,
            performance: &self.performance,
            valuation: &self.valuation,
            fundamentals: &self.fundamentals,
            macro_profile: &self.macro_profile,
            scores: &self.scores,
            verdict: &self.verdict,
            risk_level: Metric::Unavailable,
            outlook: Metric::Unavailable,
            price_target: Metric::Unavailable,
        }
    }
}

fn no_risk() -> RiskAssessment {
    RiskAssessment {
        level: Metric::Unavailable,
        score: 0,
        reasoning: Vec::new(),
    }
}

#[test]
fn test_rule_ids_are_unique() {
    let mut seen = HashSet::new();
    for rule in RULES {
        assert!(seen.insert(rule.id), "duplicate rule id {}", rule.id);
    }
}

#[test]
fn test_blank_context_emits_nothing() {
    let fixture = Fixture::blank();
    let signals = evaluate_rules(&fixture.ctx());
    assert_eq!(signals, NarrativeSignals::default());
}

#[test]
fn test_oversold_rsi_feeds_two_sections() {
    let mut fixture = Fixture::blank();
    fixture.indicators.rsi = Metric::Available(25.0);
    fixture.indicators.rsi_zone = Metric::Available(RsiZone::Oversold);

    let signals = evaluate_rules(&fixture.ctx());
    assert_eq!(
        signals.technical_signals,
        vec!["RSI at 25.0 is oversold, a potential buying opportunity".to_string()]
    );
    assert_eq!(signals.opportunities, vec!["Oversold RSI suggests a potential rebound".to_string()]);
    assert!(signals.risk_factors.is_empty());
}

#[test]
fn test_duplicate_messages_collapse_in_order() {
    let table = [
        NarrativeRule {
            id: "first",
            section: Section::RiskFactor,
            predicate: |_| true,
            message: |_| "alpha".to_string(),
        },
        NarrativeRule {
            id: "second",
            section: Section::RiskFactor,
            predicate: |_| true,
            message: |_| "beta".to_string(),
        },
        NarrativeRule {
            id: "third",
            section: Section::RiskFactor,
            predicate: |_| true,
            message: |_| "alpha".to_string(),
        },
        NarrativeRule {
            id: "skipped",
            section: Section::Opportunity,
            predicate: |_| false,
            message: |_| "never".to_string(),
        },
    ];

    let fixture = Fixture::blank();
    let signals = evaluate_table(&table, &fixture.ctx());
    assert_eq!(signals.risk_factors, vec!["alpha".to_string(), "beta".to_string()]);
    assert!(signals.opportunities.is_empty());
}

#[test]
fn test_sector_rules_use_provider_sector_name() {
    let fundamentals = FundamentalsSnapshot {
        sector: Some("Technology".to_string()),
        ..Default::default()
    };
    let fixture = Fixture::new(&series(&[50.0]), fundamentals);

    let signals = evaluate_rules(&fixture.ctx());
    assert_eq!(signals.opportunities, vec!["Technology sector shows a positive outlook".to_string()]);
}

#[test]
fn test_long_uptrend_signals() {
    let fixture = Fixture::new(&series(&rising(300)), FundamentalsSnapshot::default());
    let signals = evaluate_rules(&fixture.ctx());

    assert!(signals
        .technical_signals
        .contains(&"Price above 200-day SMA, long-term uptrend confirmed".to_string()));
    assert!(!signals
        .risk_factors
        .iter()
        .any(|r| r.starts_with("Trading below the 200-day")));
}

#[test]
fn test_flat_series_has_no_bollinger_signal() {
    let fixture = Fixture::new(&series(&[17.3; 60]), FundamentalsSnapshot::default());
    let signals = evaluate_rules(&fixture.ctx());

    assert!(fixture.indicators.bollinger_percent_b.is_unavailable());
    assert!(!signals.technical_signals.iter().any(|s| s.contains("Bollinger")));
    assert!(!signals.opportunities.iter().any(|s| s.contains("Bollinger")));
    assert!(!signals.risk_factors.iter().any(|s| s.contains("Bollinger")));
}

#[test]
fn test_unscored_summary() {
    let fixture = Fixture::blank();
    let ctx = fixture.ctx();
    let narrative = compose(&ctx, evaluate_rules(&ctx), &no_risk());

    assert!(narrative.executive_summary.contains("could not be scored"));
    assert!(narrative.executive_summary.contains("Hold"));
    assert!(narrative.investment_thesis.starts_with("There is not enough data"));
    assert!(narrative.conclusion.contains("Factors to monitor: general market conditions."));
    assert_eq!(narrative.factor_reasoning.len(), 6);
    assert_eq!(narrative.factor_reasoning[0].stance, "Insufficient data");
}

#[test]
fn test_engine_end_to_end_is_deterministic() {
    let closes = rising(300);
    let s = series(&closes);
    let fundamentals = FundamentalsSnapshot {
        company_name: Some("Test Corp".to_string()),
        sector: Some("Healthcare".to_string()),
        profit_margin: Metric::Available(0.22),
        revenue_growth: Metric::Available(0.12),
        earnings_growth: Metric::Available(0.18),
        trailing_pe: Metric::Available(18.0),
        forward_pe: Metric::Available(15.0),
        free_cash_flow: Metric::Available(5.0e9),
        shares_outstanding: Metric::Available(1.0e9),
        beta: Metric::Available(0.9),
        ..Default::default()
    };
    let fixture = Fixture::new(&s, fundamentals);
    let inputs = RecommendationInputs {
        symbol: "TEST",
        current_price: s.current_price(),
        indicators: &fixture.indicators,
        performance: &fixture.performance,
        valuation: &fixture.valuation,
        fundamentals: &fixture.fundamentals,
        macro_profile: &fixture.macro_profile,
    };

    let engine = RecommendationEngine::default();
    let first = engine.evaluate(&inputs);
    let second = engine.evaluate(&inputs);
    assert_eq!(first, second);

    assert_eq!(first.scores.available_count(), 5);
    assert!(first.verdict.composite.is_available());
    assert!(first.price_target.is_available());
    assert!(first.narrative.executive_summary.starts_with("Test Corp (TEST)"));
    assert!(first
        .narrative
        .opportunities
        .contains(&"Company shows defensive characteristics in economic downturns".to_string()));

    // Rescoring the same ScoreSet gives the same verdict
    assert_eq!(engine.verdict(&first.scores), first.verdict);
    assert_ne!(first.verdict.recommendation, Recommendation::StrongSell);
}
