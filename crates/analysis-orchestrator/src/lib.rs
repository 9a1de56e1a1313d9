use analysis_core::{
    AnalysisError, EngineConfig, FundamentalsSnapshot, PriceSeries, RawBar, Recommendation,
};
use fundamental_analysis::{macro_profile, ValuationEngine};
use quant_analysis::PerformanceAnalyzer;
use rayon::prelude::*;
use recommendation_engine::{RecommendationEngine, RecommendationInputs, Verdict};
use technical_analysis::IndicatorEngine;

pub mod report;
pub use report::{AnalysisReport, BatchItem};

/// A single request for [`AnalysisOrchestrator::analyze_batch`]
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub fundamentals: FundamentalsSnapshot,
}

/// Runs the whole pipeline: normalize, indicators and history, valuation, scoring,
/// narrative. Holds no mutable state and can be shared across threads.
pub struct AnalysisOrchestrator {
    config: EngineConfig,
    indicator_engine: IndicatorEngine,
    performance_analyzer: PerformanceAnalyzer,
    valuation_engine: ValuationEngine,
    recommendation_engine: RecommendationEngine,
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl AnalysisOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            indicator_engine: IndicatorEngine::new(config.indicators.clone()),
            performance_analyzer: PerformanceAnalyzer::new(),
            valuation_engine: ValuationEngine::new(config.dcf.clone(), config.bands.clone()),
            recommendation_engine: RecommendationEngine::new(config.weights, config.thresholds),
            config,
        }
    }

    /// Validates the configuration before building the engines.
    pub fn try_new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one security.
    ///
    /// Only malformed bars and an empty series fail the request. Anything the
    /// history or the fundamentals cannot support is reported as unavailable.
    pub fn analyze(
        &self,
        symbol: &str,
        bars: Vec<RawBar>,
        fundamentals: FundamentalsSnapshot,
    ) -> Result<AnalysisReport, AnalysisError> {
        tracing::info!("Starting analysis for {} ({} raw bars)", symbol, bars.len());

        let series = PriceSeries::normalize(bars).map_err(|e| {
            tracing::warn!("Rejected price history for {}: {}", symbol, e);
            e
        })?;
        let current_price = series.current_price();

        let (indicators, performance) = rayon::join(
            || self.indicator_engine.compute(&series),
            || self.performance_analyzer.summarize(&series),
        );

        let missing = indicators.unavailable();
        if !missing.is_empty() {
            tracing::debug!("{}: indicators unavailable: {}", symbol, missing.join(", "));
        }

        let valuation = self.valuation_engine.evaluate(&fundamentals, current_price);
        let macro_profile = macro_profile(
            fundamentals.sector.as_deref(),
            fundamentals.industry.as_deref(),
            fundamentals.beta,
        );

        let outcome = self.recommendation_engine.evaluate(&RecommendationInputs {
            symbol,
            current_price,
            indicators: &indicators,
            performance: &performance,
            valuation: &valuation,
            fundamentals: &fundamentals,
            macro_profile: &macro_profile,
        });

        let report = AnalysisReport {
            symbol: symbol.to_string(),
            as_of: series.last().date,
            current_price,
            bar_count: series.len(),
            fundamentals,
            indicators,
            performance,
            valuation,
            macro_profile,
            scores: outcome.scores,
            composite: outcome.verdict.composite,
            recommendation: outcome.verdict.recommendation,
            confidence: outcome.verdict.confidence,
            risk: outcome.risk,
            price_target: outcome.price_target,
            outlook: outcome.outlook,
            narrative: outcome.narrative,
        };

        tracing::info!(
            "Analysis complete for {}: {} (composite {})",
            symbol,
            report.recommendation.to_label(),
            report
                .composite
                .get()
                .map(|c| format!("{:.1}", c))
                .unwrap_or_else(|| "n/a".to_string())
        );

        Ok(report)
    }

    /// Analyze independent requests in parallel. Results keep the input order.
    pub fn analyze_batch(&self, requests: Vec<AnalysisRequest>) -> Vec<BatchItem> {
        tracing::info!("Starting batch analysis of {} symbols", requests.len());

        requests
            .into_par_iter()
            .map(|req| BatchItem {
                result: self.analyze(&req.symbol, req.bars, req.fundamentals),
                symbol: req.symbol,
            })
            .collect()
    }

    /// Re-derive composite, recommendation and confidence from the report's own
    /// sub-scores.
    pub fn rescore(&self, report: &AnalysisReport) -> Verdict {
        self.recommendation_engine.verdict(&report.scores)
    }

    /// Whether a report's stored verdict matches a fresh rescoring.
    pub fn is_consistent(&self, report: &AnalysisReport) -> bool {
        let verdict = self.rescore(report);
        verdict.composite == report.composite
            && verdict.recommendation == report.recommendation
            && verdict.confidence == report.confidence
    }
}

/// Highest-ranked successful reports first; failed requests are dropped.
pub fn rank_reports(items: &[BatchItem]) -> Vec<&AnalysisReport> {
    let mut reports: Vec<&AnalysisReport> = items.iter().filter_map(|i| i.result.as_ref().ok()).collect();
    reports.sort_by(|a, b| {
        b.recommendation
            .rank()
            .cmp(&a.recommendation.rank())
            .then_with(|| {
                let ca = a.composite.unwrap_or(f64::NEG_INFINITY);
                let cb = b.composite.unwrap_or(f64::NEG_INFINITY);
                cb.total_cmp(&ca)
            })
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    reports
}

/// Count of reports per recommendation, most bullish first.
pub fn recommendation_breakdown(items: &[BatchItem]) -> Vec<(Recommendation, usize)> {
    [
        Recommendation::StrongBuy,
        Recommendation::Buy,
        Recommendation::Hold,
        Recommendation::Sell,
        Recommendation::StrongSell,
    ]
    .into_iter()
    .map(|rec| {
        let count = items
            .iter()
            .filter(|i| matches!(&i.result, Ok(r) if r.recommendation == rec))
            .count();
        (rec, count)
    })
    .collect()
}
