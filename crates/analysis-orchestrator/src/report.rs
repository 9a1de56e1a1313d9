use analysis_core::{FundamentalsSnapshot, Metric, Recommendation};
use chrono::NaiveDate;
use fundamental_analysis::{MacroProfile, ValuationSummary};
use quant_analysis::PerformanceSummary;
use recommendation_engine::{
    Confidence, LongTermOutlook, Narrative, PriceTarget, RiskAssessment, ScoreSet,
};
use serde::{Deserialize, Serialize};
use technical_analysis::IndicatorSet;

/// Full analysis of one security.
///
/// A pure function of the request: `as_of` is the date of the last bar, not the
/// time the report was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub current_price: f64,
    pub bar_count: usize,
    pub fundamentals: FundamentalsSnapshot,
    pub indicators: IndicatorSet,
    pub performance: PerformanceSummary,
    pub valuation: ValuationSummary,
    pub macro_profile: MacroProfile,
    pub scores: ScoreSet,
    /// Weighted 0-100 composite of the available sub-scores
    pub composite: Metric<f64>,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    pub risk: RiskAssessment,
    pub price_target: Metric<PriceTarget>,
    pub outlook: Metric<LongTermOutlook>,
    pub narrative: Narrative,
}

impl AnalysisReport {
    /// Headline indicators that could not be computed for this series.
    pub fn unavailable_indicators(&self) -> Vec<&'static str> {
        self.indicators.unavailable()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One entry of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub symbol: String,
    pub result: Result<AnalysisReport, analysis_core::AnalysisError>,
}
