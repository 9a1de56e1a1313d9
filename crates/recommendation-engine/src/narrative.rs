//! Report narrative.
//!
//! Signals, opportunities and risk factors come from [`RULES`], an ordered table of
//! predicate/message pairs evaluated against a read-only [`NarrativeContext`]. The
//! summary paragraphs are then assembled from those lists and the computed scores.
//! Everything here is plain string formatting of values that already exist.

use analysis_core::{FundamentalsSnapshot, Metric};
use fundamental_analysis::{
    Exposure, MacroProfile, MarketConditions, RatioAssessment, SectorOutlook, ValuationClass,
    ValuationSummary,
};
use quant_analysis::PerformanceSummary;
use serde::{Deserialize, Serialize};
use technical_analysis::{
    IndicatorSet, MacdCrossover, RsiZone, TrendAlignment, TrendDirection, VolumeLevel,
};

use crate::recommendation::{LongTermOutlook, PriceTarget, RiskAssessment, RiskLevel, Verdict};
use crate::scoring::ScoreSet;

const TIME_HORIZON: &str = "12-24 month";

/// Everything a rule may look at
pub struct NarrativeContext<'a> {
    pub symbol: &'a str,
    pub current_price: f64,
    pub indicators: &'a IndicatorSet,
    pub performance: &'a PerformanceSummary,
    pub valuation: &'a ValuationSummary,
    pub fundamentals: &'a FundamentalsSnapshot,
    pub macro_profile: &'a MacroProfile,
    pub scores: &'a ScoreSet,
    pub verdict: &'a Verdict,
    pub risk_level: Metric<RiskLevel>,
    pub outlook: Metric<LongTermOutlook>,
    pub price_target: Metric<PriceTarget>,
}

impl NarrativeContext<'_> {
    fn company_name(&self) -> &str {
        self.fundamentals.company_name.as_deref().unwrap_or(self.symbol)
    }

    fn sector_name(&self) -> &str {
        self.fundamentals
            .sector
            .as_deref()
            .or(self.macro_profile.matched_sector.as_deref())
            .unwrap_or("The")
    }

    fn dcf_upside(&self) -> Option<f64> {
        self.valuation.dcf.value().and_then(|d| d.upside_pct.get())
    }

    fn relative_class(&self) -> Option<ValuationClass> {
        self.valuation.relative.value().map(|r| r.overall)
    }

    fn one_year_return(&self) -> Option<f64> {
        self.performance.one_year.value().and_then(|w| w.return_pct.get())
    }

    fn five_year_return(&self) -> Option<f64> {
        self.performance.five_year.value().and_then(|w| w.return_pct.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    TechnicalSignal,
    FundamentalSignal,
    Opportunity,
    RiskFactor,
}

pub struct NarrativeRule {
    pub id: &'static str,
    pub section: Section,
    pub predicate: fn(&NarrativeContext) -> bool,
    pub message: fn(&NarrativeContext) -> String,
}

fn has(metric: Metric<f64>, predicate: impl FnOnce(f64) -> bool) -> bool {
    metric.get().map_or(false, predicate)
}

fn positive_pe(c: &NarrativeContext<'_>) -> Option<f64> {
    c.fundamentals.trailing_pe.get().filter(|pe| *pe > 0.0)
}

/// Evaluated top to bottom; output order follows this table.
pub const RULES: &[NarrativeRule] = &[
    // Technical
    NarrativeRule {
        id: "rsi_neutral",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.rsi_zone == Metric::Available(RsiZone::Neutral),
        message: |_| "RSI shows neutral momentum, neither overbought nor oversold".to_string(),
    },
    NarrativeRule {
        id: "rsi_oversold",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.rsi_zone == Metric::Available(RsiZone::Oversold),
        message: |c| format!("RSI at {:.1} is oversold, a potential buying opportunity", c.indicators.rsi.unwrap_or(0.0)),
    },
    NarrativeRule {
        id: "rsi_overbought",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.rsi_zone == Metric::Available(RsiZone::Overbought),
        message: |c| format!("RSI at {:.1} is overbought, caution advised", c.indicators.rsi.unwrap_or(0.0)),
    },
    NarrativeRule {
        id: "sma_long_above",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.sma_long.price_vs_pct, |p| p > 0.0),
        message: |c| format!("Price above {}-day SMA, long-term uptrend confirmed", c.indicators.sma_long.period),
    },
    NarrativeRule {
        id: "sma_long_below",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.sma_long.price_vs_pct, |p| p <= 0.0),
        message: |c| format!("Price below {}-day SMA, long-term downtrend", c.indicators.sma_long.period),
    },
    NarrativeRule {
        id: "sma_medium_above",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.sma_medium.price_vs_pct, |p| p > 0.0),
        message: |c| format!("Price above {}-day SMA, medium-term bullish", c.indicators.sma_medium.period),
    },
    NarrativeRule {
        id: "sma_medium_below",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.sma_medium.price_vs_pct, |p| p <= 0.0),
        message: |c| format!("Price below {}-day SMA, medium-term bearish", c.indicators.sma_medium.period),
    },
    NarrativeRule {
        id: "sma_short_above",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.sma_short.price_vs_pct, |p| p > 0.0),
        message: |c| format!("Price above {}-day SMA, short-term positive momentum", c.indicators.sma_short.period),
    },
    NarrativeRule {
        id: "trend_uptrend",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.trend_alignment == Metric::Available(TrendAlignment::Uptrend),
        message: |_| "Moving averages stacked in uptrend order".to_string(),
    },
    NarrativeRule {
        id: "trend_downtrend",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.trend_alignment == Metric::Available(TrendAlignment::Downtrend),
        message: |_| "Moving averages stacked in downtrend order".to_string(),
    },
    NarrativeRule {
        id: "macd_bullish",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.macd_histogram, |h| h > 0.0),
        message: |_| "MACD above signal line, bullish momentum".to_string(),
    },
    NarrativeRule {
        id: "macd_bearish",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.macd_histogram, |h| h <= 0.0),
        message: |_| "MACD below signal line, bearish momentum".to_string(),
    },
    NarrativeRule {
        id: "macd_cross_bullish",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.macd_crossover == Metric::Available(MacdCrossover::Bullish),
        message: |_| "MACD crossed above its signal line on the latest bar".to_string(),
    },
    NarrativeRule {
        id: "macd_cross_bearish",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.macd_crossover == Metric::Available(MacdCrossover::Bearish),
        message: |_| "MACD crossed below its signal line on the latest bar".to_string(),
    },
    NarrativeRule {
        id: "bollinger_normal",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.bollinger_percent_b, |b| (20.0..=80.0).contains(&b)),
        message: |_| "Price within the normal Bollinger Band range".to_string(),
    },
    NarrativeRule {
        id: "bollinger_lower",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.bollinger_percent_b, |b| b < 20.0),
        message: |_| "Price near the lower Bollinger Band, potential support".to_string(),
    },
    NarrativeRule {
        id: "bollinger_upper",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.bollinger_percent_b, |b| b > 80.0),
        message: |_| "Price near the upper Bollinger Band, potential resistance".to_string(),
    },
    NarrativeRule {
        id: "stochastic_bullish",
        section: Section::TechnicalSignal,
        predicate: |c| match (c.indicators.stochastic_k.get(), c.indicators.stochastic_d.get()) {
            (Some(k), Some(d)) => k > d && k < 80.0,
            _ => false,
        },
        message: |_| "Stochastic shows bullish momentum".to_string(),
    },
    NarrativeRule {
        id: "stochastic_bearish",
        section: Section::TechnicalSignal,
        predicate: |c| match (c.indicators.stochastic_k.get(), c.indicators.stochastic_d.get()) {
            (Some(k), Some(d)) => k < d && k > 20.0,
            _ => false,
        },
        message: |_| "Stochastic shows bearish momentum".to_string(),
    },
    NarrativeRule {
        id: "volume_elevated",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.volume_level == Metric::Available(VolumeLevel::Elevated),
        message: |_| "Above-average volume indicates strong interest".to_string(),
    },
    NarrativeRule {
        id: "volume_depressed",
        section: Section::TechnicalSignal,
        predicate: |c| c.indicators.volume_level == Metric::Available(VolumeLevel::Depressed),
        message: |_| "Below-average volume suggests weak conviction".to_string(),
    },
    NarrativeRule {
        id: "momentum_positive",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.momentum, |m| m > 0.0),
        message: |_| "Positive price momentum".to_string(),
    },
    NarrativeRule {
        id: "momentum_negative",
        section: Section::TechnicalSignal,
        predicate: |c| has(c.indicators.momentum, |m| m <= 0.0),
        message: |_| "Negative momentum, price declining".to_string(),
    },
    // Fundamental
    NarrativeRule {
        id: "pe_reasonable",
        section: Section::FundamentalSignal,
        predicate: |c| positive_pe(c).map_or(false, |pe| (10.0..=25.0).contains(&pe)),
        message: |_| "P/E ratio in a reasonable range".to_string(),
    },
    NarrativeRule {
        id: "pe_low",
        section: Section::FundamentalSignal,
        predicate: |c| positive_pe(c).map_or(false, |pe| pe < 10.0),
        message: |_| "Low P/E ratio suggests undervaluation".to_string(),
    },
    NarrativeRule {
        id: "pe_high",
        section: Section::FundamentalSignal,
        predicate: |c| positive_pe(c).map_or(false, |pe| pe > 30.0),
        message: |_| "High P/E ratio suggests overvaluation".to_string(),
    },
    NarrativeRule {
        id: "peg_low",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.peg_ratio, |p| p > 0.0 && p < 1.0),
        message: |_| "PEG ratio below 1, growth at a reasonable price".to_string(),
    },
    NarrativeRule {
        id: "peg_acceptable",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.peg_ratio, |p| (1.0..=2.0).contains(&p)),
        message: |_| "PEG ratio in an acceptable range".to_string(),
    },
    NarrativeRule {
        id: "profit_margin_strong",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.profit_margin, |m| m > 0.15),
        message: |_| "Strong profit margins indicate efficient operations".to_string(),
    },
    NarrativeRule {
        id: "roe_high",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.return_on_equity, |r| r > 0.15),
        message: |_| "High return on equity shows efficient capital use".to_string(),
    },
    NarrativeRule {
        id: "debt_low",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.debt_to_equity, |d| d < 1.0),
        message: |_| "Low debt-to-equity ratio indicates financial stability".to_string(),
    },
    NarrativeRule {
        id: "current_ratio_healthy",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.current_ratio, |r| (1.5..=3.0).contains(&r)),
        message: |_| "Healthy current ratio indicates good liquidity".to_string(),
    },
    NarrativeRule {
        id: "revenue_growth_strong",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.revenue_growth, |g| g > 0.10),
        message: |_| "Strong revenue growth indicates an expanding business".to_string(),
    },
    NarrativeRule {
        id: "earnings_growth_strong",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.earnings_growth, |g| g > 0.15),
        message: |_| "Strong earnings growth shows improving profitability".to_string(),
    },
    NarrativeRule {
        id: "forward_pe_lower",
        section: Section::FundamentalSignal,
        predicate: |c| match (c.fundamentals.forward_pe.get(), positive_pe(c)) {
            (Some(forward), Some(trailing)) => forward > 0.0 && forward < trailing,
            _ => false,
        },
        message: |_| "Forward P/E below trailing, earnings expected to grow".to_string(),
    },
    NarrativeRule {
        id: "large_cap",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.market_cap, |m| m > 10.0e9),
        message: |_| "Large market cap indicates an established company".to_string(),
    },
    NarrativeRule {
        id: "beta_market",
        section: Section::FundamentalSignal,
        predicate: |c| has(c.fundamentals.beta, |b| (0.8..=1.2).contains(&b)),
        message: |_| "Beta near 1, market-aligned volatility".to_string(),
    },
    NarrativeRule {
        id: "one_year_strong",
        section: Section::FundamentalSignal,
        predicate: |c| c.one_year_return().map_or(false, |r| r > 20.0),
        message: |c| format!("Strong 1-year return of {:.1}%", c.one_year_return().unwrap_or(0.0)),
    },
    NarrativeRule {
        id: "five_year_excellent",
        section: Section::FundamentalSignal,
        predicate: |c| c.five_year_return().map_or(false, |r| r > 50.0),
        message: |c| format!("Excellent 5-year return of {:.1}% shows long-term growth", c.five_year_return().unwrap_or(0.0)),
    },
    // Opportunities
    NarrativeRule {
        id: "rsi_rebound",
        section: Section::Opportunity,
        predicate: |c| c.indicators.rsi_zone == Metric::Available(RsiZone::Oversold),
        message: |_| "Oversold RSI suggests a potential rebound".to_string(),
    },
    NarrativeRule {
        id: "bollinger_bounce",
        section: Section::Opportunity,
        predicate: |c| has(c.indicators.bollinger_percent_b, |b| b < 20.0),
        message: |_| "Near the lower Bollinger Band, a bounce is possible".to_string(),
    },
    NarrativeRule {
        id: "stochastic_reversal",
        section: Section::Opportunity,
        predicate: |c| has(c.indicators.stochastic_k, |k| k < 20.0),
        message: |_| "Oversold stochastic suggests a potential reversal".to_string(),
    },
    NarrativeRule {
        id: "pe_value",
        section: Section::Opportunity,
        predicate: |c| positive_pe(c).map_or(false, |pe| pe < 10.0),
        message: |_| "Attractive P/E ratio indicates potential value".to_string(),
    },
    NarrativeRule {
        id: "peg_growth",
        section: Section::Opportunity,
        predicate: |c| has(c.fundamentals.peg_ratio, |p| p > 0.0 && p < 1.0),
        message: |_| "Low PEG ratio suggests growth potential".to_string(),
    },
    NarrativeRule {
        id: "revenue_expansion",
        section: Section::Opportunity,
        predicate: |c| has(c.fundamentals.revenue_growth, |g| g > 0.10),
        message: |_| "High revenue growth suggests market expansion".to_string(),
    },
    NarrativeRule {
        id: "earnings_improvement",
        section: Section::Opportunity,
        predicate: |c| has(c.fundamentals.earnings_growth, |g| g > 0.15),
        message: |_| "High earnings growth indicates improving fundamentals".to_string(),
    },
    NarrativeRule {
        id: "five_year_track_record",
        section: Section::Opportunity,
        predicate: |c| c.five_year_return().map_or(false, |r| r > 50.0),
        message: |_| "Strong 5-year track record indicates a quality business".to_string(),
    },
    NarrativeRule {
        id: "below_book",
        section: Section::Opportunity,
        predicate: |c| has(c.fundamentals.price_to_book, |pb| pb > 0.0 && pb < 1.0),
        message: |_| "Price below book value suggests deep value".to_string(),
    },
    NarrativeRule {
        id: "analyst_upside",
        section: Section::Opportunity,
        predicate: |c| has(c.valuation.analyst_upside_pct, |u| u > 10.0),
        message: |c| format!("Analyst target suggests {:.1}% upside potential", c.valuation.analyst_upside_pct.unwrap_or(0.0)),
    },
    NarrativeRule {
        id: "dcf_upside",
        section: Section::Opportunity,
        predicate: |c| c.dcf_upside().map_or(false, |u| u > 15.0),
        message: |c| format!("DCF model suggests {:.1}% upside potential", c.dcf_upside().unwrap_or(0.0)),
    },
    NarrativeRule {
        id: "relative_discount",
        section: Section::Opportunity,
        predicate: |c| c.relative_class() == Some(ValuationClass::Cheap),
        message: |_| "Relative valuation shows the stock trading at a discount to the market".to_string(),
    },
    NarrativeRule {
        id: "sector_positive",
        section: Section::Opportunity,
        predicate: |c| c.macro_profile.sector_outlook == SectorOutlook::Positive,
        message: |c| format!("{} sector shows a positive outlook", c.sector_name()),
    },
    NarrativeRule {
        id: "defensive",
        section: Section::Opportunity,
        predicate: |c| c.macro_profile.recession_resilience >= Exposure::High,
        message: |_| "Company shows defensive characteristics in economic downturns".to_string(),
    },
    // Risk factors
    NarrativeRule {
        id: "rsi_pullback",
        section: Section::RiskFactor,
        predicate: |c| c.indicators.rsi_zone == Metric::Available(RsiZone::Overbought),
        message: |_| "High RSI suggests a potential pullback".to_string(),
    },
    NarrativeRule {
        id: "below_long_average",
        section: Section::RiskFactor,
        predicate: |c| has(c.indicators.sma_long.price_vs_pct, |p| p <= 0.0),
        message: |c| format!("Trading below the {}-day moving average, weak long-term trend", c.indicators.sma_long.period),
    },
    NarrativeRule {
        id: "macd_weakening",
        section: Section::RiskFactor,
        predicate: |c| has(c.indicators.macd_histogram, |h| h <= 0.0),
        message: |_| "MACD below signal line indicates weakening momentum".to_string(),
    },
    NarrativeRule {
        id: "bollinger_pullback",
        section: Section::RiskFactor,
        predicate: |c| has(c.indicators.bollinger_percent_b, |b| b > 80.0),
        message: |_| "Near the upper Bollinger Band, a pullback is possible".to_string(),
    },
    NarrativeRule {
        id: "downward_pressure",
        section: Section::RiskFactor,
        predicate: |c| has(c.indicators.momentum, |m| m <= 0.0),
        message: |_| "Negative momentum indicates downward price pressure".to_string(),
    },
    NarrativeRule {
        id: "rsi_falling",
        section: Section::RiskFactor,
        predicate: |c| c.indicators.rsi_trend == Metric::Available(TrendDirection::Falling)
            && c.indicators.rsi_zone != Metric::Available(RsiZone::Oversold),
        message: |_| "Falling RSI shows fading buying pressure".to_string(),
    },
    NarrativeRule {
        id: "pe_expensive",
        section: Section::RiskFactor,
        predicate: |c| positive_pe(c).map_or(false, |pe| pe > 30.0),
        message: |_| "Elevated P/E ratio indicates an expensive valuation".to_string(),
    },
    NarrativeRule {
        id: "peg_high",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.peg_ratio, |p| p > 2.0),
        message: |_| "High PEG ratio suggests overvaluation relative to growth".to_string(),
    },
    NarrativeRule {
        id: "negative_margin",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.profit_margin, |m| m < 0.0),
        message: |_| "Negative profit margins indicate financial distress".to_string(),
    },
    NarrativeRule {
        id: "negative_roe",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.return_on_equity, |r| r < 0.0),
        message: |_| "Negative ROE indicates poor capital efficiency".to_string(),
    },
    NarrativeRule {
        id: "high_leverage",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.debt_to_equity, |d| d > 2.0),
        message: |_| "High debt-to-equity ratio increases financial risk".to_string(),
    },
    NarrativeRule {
        id: "weak_liquidity",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.current_ratio, |r| r < 1.0),
        message: |_| "Current ratio below 1 suggests liquidity concerns".to_string(),
    },
    NarrativeRule {
        id: "revenue_decline",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.revenue_growth, |g| g < 0.0),
        message: |_| "Declining revenue indicates business contraction".to_string(),
    },
    NarrativeRule {
        id: "earnings_decline",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.earnings_growth, |g| g < 0.0),
        message: |_| "Negative earnings growth indicates declining profitability".to_string(),
    },
    NarrativeRule {
        id: "high_beta",
        section: Section::RiskFactor,
        predicate: |c| has(c.fundamentals.beta, |b| b > 1.5),
        message: |_| "High beta indicates high volatility and market sensitivity".to_string(),
    },
    NarrativeRule {
        id: "high_volatility",
        section: Section::RiskFactor,
        predicate: |c| has(c.indicators.volatility, |v| v >= 0.40),
        message: |c| format!("Annualized volatility of {:.1}%", c.indicators.volatility.unwrap_or(0.0) * 100.0),
    },
    NarrativeRule {
        id: "one_year_negative",
        section: Section::RiskFactor,
        predicate: |c| c.one_year_return().map_or(false, |r| r < 0.0),
        message: |_| "Negative 1-year return indicates poor recent performance".to_string(),
    },
    NarrativeRule {
        id: "five_year_negative",
        section: Section::RiskFactor,
        predicate: |c| c.five_year_return().map_or(false, |r| r < 0.0),
        message: |_| "Negative 5-year return indicates long-term underperformance".to_string(),
    },
    NarrativeRule {
        id: "deep_drawdown",
        section: Section::RiskFactor,
        predicate: |c| has(c.performance.all_time.max_drawdown_pct, |d| d > 50.0),
        message: |c| format!(
            "Maximum historical drawdown of {:.1}%",
            c.performance.all_time.max_drawdown_pct.unwrap_or(0.0)
        ),
    },
    NarrativeRule {
        id: "dcf_downside",
        section: Section::RiskFactor,
        predicate: |c| c.dcf_upside().map_or(false, |u| u < -15.0),
        message: |c| format!("DCF model suggests {:.1}% downside risk", c.dcf_upside().unwrap_or(0.0).abs()),
    },
    NarrativeRule {
        id: "relative_premium",
        section: Section::RiskFactor,
        predicate: |c| c.relative_class() == Some(ValuationClass::Expensive),
        message: |_| "Relative valuation shows the stock trading at a premium to the market".to_string(),
    },
    NarrativeRule {
        id: "sector_headwinds",
        section: Section::RiskFactor,
        predicate: |c| matches!(c.macro_profile.sector_outlook, SectorOutlook::Cautious | SectorOutlook::Volatile),
        message: |c| format!("{} sector faces headwinds", c.sector_name()),
    },
    NarrativeRule {
        id: "recession_vulnerable",
        section: Section::RiskFactor,
        predicate: |c| c.macro_profile.recession_resilience == Exposure::Low,
        message: |_| "Company is vulnerable to economic downturns".to_string(),
    },
    NarrativeRule {
        id: "volatile_market",
        section: Section::RiskFactor,
        predicate: |c| c.macro_profile.market_conditions == MarketConditions::HighVolatility,
        message: |_| "Share price is highly sensitive to broad market moves".to_string(),
    },
];

/// Output of the rule table, one list per section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSignals {
    pub technical_signals: Vec<String>,
    pub fundamental_signals: Vec<String>,
    pub opportunities: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl NarrativeSignals {
    fn push(&mut self, section: Section, message: String) {
        let list = match section {
            Section::TechnicalSignal => &mut self.technical_signals,
            Section::FundamentalSignal => &mut self.fundamental_signals,
            Section::Opportunity => &mut self.opportunities,
            Section::RiskFactor => &mut self.risk_factors,
        };
        if !list.contains(&message) {
            list.push(message);
        }
    }
}

pub fn evaluate_rules(ctx: &NarrativeContext<'_>) -> NarrativeSignals {
    evaluate_table(RULES, ctx)
}

pub(crate) fn evaluate_table(rules: &[NarrativeRule], ctx: &NarrativeContext<'_>) -> NarrativeSignals {
    let mut signals = NarrativeSignals::default();
    for rule in rules.iter().filter(|r| (r.predicate)(ctx)) {
        signals.push(rule.section, (rule.message)(ctx));
    }
    signals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasoningFactor {
    Technical,
    Fundamental,
    Momentum,
    Value,
    Growth,
    Macro,
}

impl ReasoningFactor {
    pub fn to_label(&self) -> &'static str {
        match self {
            ReasoningFactor::Technical => "Technical analysis",
            ReasoningFactor::Fundamental => "Fundamental analysis",
            ReasoningFactor::Momentum => "Momentum",
            ReasoningFactor::Value => "Valuation",
            ReasoningFactor::Growth => "Growth",
            ReasoningFactor::Macro => "Macroeconomic factors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorReasoning {
    pub factor: ReasoningFactor,
    /// Unavailable for the macro factor, which is not scored
    pub score: Metric<u8>,
    pub stance: String,
    pub key_points: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub executive_summary: String,
    pub technical_signals: Vec<String>,
    pub fundamental_signals: Vec<String>,
    pub opportunities: Vec<String>,
    pub risk_factors: Vec<String>,
    pub factor_reasoning: Vec<FactorReasoning>,
    pub risk_summary: String,
    pub investment_thesis: String,
    pub conclusion: String,
}

fn score_text(score: Metric<u8>) -> String {
    match score {
        Metric::Available(s) => format!("{}/100", s),
        Metric::Unavailable => "n/a".to_string(),
    }
}

fn composite_text(composite: Metric<f64>) -> String {
    match composite {
        Metric::Available(c) => format!("{:.1}/100", c),
        Metric::Unavailable => "n/a".to_string(),
    }
}

fn risk_text(level: Metric<RiskLevel>) -> &'static str {
    level.value().map(|l| l.to_label()).unwrap_or("undetermined")
}

fn outlook_text(outlook: Metric<LongTermOutlook>) -> &'static str {
    outlook.value().map(|o| o.to_label()).unwrap_or("undetermined")
}

/// Stance from a score with `(bullish cutoff, bearish cutoff, labels)`.
fn stance(score: Metric<u8>, high: u8, low: u8, labels: [&str; 3]) -> String {
    let label = match score.get() {
        Some(s) if s > high => labels[0],
        Some(s) if s < low => labels[1],
        Some(_) => labels[2],
        None => "Insufficient data",
    };
    label.to_string()
}

fn technical_points(c: &NarrativeContext<'_>) -> Vec<String> {
    let ind = c.indicators;
    let mut points = Vec::new();

    if let (Some(rsi), Some(zone)) = (ind.rsi.get(), ind.rsi_zone.get()) {
        points.push(match zone {
            RsiZone::Oversold => format!("RSI of {:.1} is oversold; the stock may be undervalued short-term.", rsi),
            RsiZone::Overbought => format!("RSI of {:.1} is overbought; the stock may be due for a pullback.", rsi),
            RsiZone::Neutral => format!("RSI of {:.1} is in neutral territory, indicating balanced momentum.", rsi),
        });
    }
    if let Some(pct) = ind.sma_long.price_vs_pct.get() {
        let period = ind.sma_long.period;
        points.push(if pct > 0.0 {
            format!("Price is {:.1}% above the {}-day moving average, confirming a long-term uptrend.", pct, period)
        } else {
            format!("Price is {:.1}% below the {}-day moving average, indicating a long-term downtrend.", pct.abs(), period)
        });
    }
    if let (Some(macd), Some(signal)) = (ind.macd.get(), ind.macd_signal.get()) {
        let side = if macd > signal { "above" } else { "below" };
        let tone = if macd > signal { "bullish" } else { "bearish" };
        points.push(format!(
            "MACD ({:.4}) is {} its signal line ({:.4}), indicating {} momentum.",
            macd, side, signal, tone
        ));
    }
    if let Some(b) = ind.bollinger_percent_b.get() {
        points.push(format!("Bollinger %B is {:.1}.", b));
    }
    points
}

fn fundamental_points(c: &NarrativeContext<'_>) -> Vec<String> {
    let f = c.fundamentals;
    let mut points = Vec::new();

    if let Some(pe) = positive_pe(c) {
        points.push(if pe < 15.0 {
            format!("P/E ratio of {:.1} is attractive relative to earnings.", pe)
        } else if pe > 30.0 {
            format!("P/E ratio of {:.1} is elevated and prices in high growth expectations.", pe)
        } else {
            format!("P/E ratio of {:.1} is in a reasonable range.", pe)
        });
    }
    if let Some(m) = f.profit_margin.get() {
        if m > 0.15 {
            points.push(format!("Profit margin of {:.1}% is strong, indicating pricing power.", m * 100.0));
        } else if m < 0.0 {
            points.push(format!("Negative profit margin of {:.1}% means the company is losing money.", m * 100.0));
        }
    }
    if let Some(roe) = f.return_on_equity.get() {
        if roe > 0.15 {
            points.push(format!("Return on equity of {:.1}% shows efficient use of shareholder capital.", roe * 100.0));
        } else if roe < 0.0 {
            points.push(format!("Negative ROE of {:.1}% indicates poor capital efficiency.", roe * 100.0));
        }
    }
    if let Some(d) = f.debt_to_equity.get() {
        points.push(format!("Debt-to-equity stands at {:.2}.", d));
    }
    if let Some(r) = f.current_ratio.get() {
        points.push(format!("Current ratio stands at {:.2}.", r));
    }
    points
}

fn momentum_points(c: &NarrativeContext<'_>) -> Vec<String> {
    let ind = c.indicators;
    let mut points = Vec::new();

    if let Some(change) = ind.recent_change() {
        if let Some(pct) = change.change_pct.get() {
            points.push(format!("Price moved {:+.1}% over the last {} bars.", pct, change.period));
        }
    }
    if let Some(r) = c.one_year_return() {
        points.push(format!("Trailing 1-year return is {:+.1}%.", r));
    }
    if let Some(ratio) = ind.volume_ratio.get() {
        points.push(format!("Volume is running at {:.0}% of its recent average.", ratio));
    }
    if let Some(trend) = ind.rsi_trend.get() {
        let word = match trend {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Flat => "flat",
        };
        points.push(format!("RSI trend is {}.", word));
    }
    points
}

fn value_points(c: &NarrativeContext<'_>) -> Vec<String> {
    let mut points = Vec::new();

    if let Some(dcf) = c.valuation.dcf.value() {
        let upside = match dcf.upside_pct.get() {
            Some(u) if u > 0.0 => format!("{:.1}% upside potential", u),
            Some(u) => format!("{:.1}% downside risk", u.abs()),
            None => "no comparison to the current price".to_string(),
        };
        let a = &dcf.assumptions;
        points.push(format!(
            "DCF model estimates an intrinsic value of ${:.2} per share against a price of ${:.2}, {}. \
             Assumes {:.1}% growth, {:.1}% discount rate and {:.1}% terminal growth.",
            dcf.intrinsic_value,
            c.current_price,
            upside,
            a.growth_rate * 100.0,
            a.discount_rate * 100.0,
            a.terminal_growth_rate * 100.0
        ));
    }
    if let Some(rel) = c.valuation.relative.value() {
        let pct = |m: &Metric<RatioAssessment>| {
            m.value()
                .map(|a| format!("{:.0}%", a.pct_of_market))
                .unwrap_or_else(|| "n/a".to_string())
        };
        points.push(format!(
            "Relative valuation rates the stock {} against market averages (P/E {}, P/B {}, P/S {} of market).",
            rel.overall.to_label(),
            pct(&rel.price_to_earnings),
            pct(&rel.price_to_book),
            pct(&rel.price_to_sales)
        ));
    }
    if let Some(u) = c.valuation.analyst_upside_pct.get() {
        points.push(format!("Analyst mean target implies {:+.1}% from the current price.", u));
    }
    points
}

fn growth_points(c: &NarrativeContext<'_>) -> Vec<String> {
    let f = c.fundamentals;
    let mut points = Vec::new();

    if let Some(g) = f.revenue_growth.get() {
        points.push(if g < 0.0 {
            format!("Revenue declined {:.1}%.", g.abs() * 100.0)
        } else {
            format!("Revenue grew {:.1}%.", g * 100.0)
        });
    }
    if let Some(g) = f.earnings_growth.get() {
        points.push(format!("Earnings growth is {:+.1}%.", g * 100.0));
    }
    if let Some(peg) = f.peg_ratio.get().filter(|p| *p > 0.0) {
        points.push(format!("PEG ratio of {:.2}.", peg));
    }
    points
}

fn macro_points(c: &NarrativeContext<'_>) -> Vec<String> {
    let m = c.macro_profile;
    let mut points = Vec::new();

    if let Some(sector) = &m.matched_sector {
        points.push(format!("{} sector outlook is {}.", sector, m.sector_outlook.to_label()));
    }
    if !m.economic_pressures.is_empty() {
        let pressures: Vec<&str> = m.economic_pressures.iter().take(3).map(String::as_str).collect();
        points.push(format!("Economic pressures: {}.", pressures.join("; ")));
    }
    points.push(format!(
        "Interest rate sensitivity is {}; recession resilience is {}.",
        m.interest_rate_sensitivity.to_label(),
        m.recession_resilience.to_label()
    ));
    points
}

fn factor(factor: ReasoningFactor, score: Metric<u8>, stance: String, key_points: Vec<String>) -> FactorReasoning {
    let lead = match score {
        Metric::Available(s) => format!("{} yields a score of {}/100.", factor.to_label(), s),
        Metric::Unavailable => format!("{}:", factor.to_label()),
    };
    let summary = std::iter::once(lead)
        .chain(key_points.iter().take(3).cloned())
        .collect::<Vec<_>>()
        .join(" ");

    FactorReasoning {
        factor,
        score,
        stance,
        key_points,
        summary,
    }
}

fn factor_reasoning(c: &NarrativeContext<'_>) -> Vec<FactorReasoning> {
    let s = c.scores;
    vec![
        factor(
            ReasoningFactor::Technical,
            s.technical,
            stance(s.technical, 60, 40, ["Bullish", "Bearish", "Neutral"]),
            technical_points(c),
        ),
        factor(
            ReasoningFactor::Fundamental,
            s.fundamental,
            stance(s.fundamental, 65, 45, ["Strong", "Weak", "Moderate"]),
            fundamental_points(c),
        ),
        factor(
            ReasoningFactor::Momentum,
            s.momentum,
            stance(s.momentum, 60, 40, ["Positive", "Negative", "Neutral"]),
            momentum_points(c),
        ),
        factor(
            ReasoningFactor::Value,
            s.value,
            stance(s.value, 60, 40, ["Attractive", "Rich", "Fair"]),
            value_points(c),
        ),
        factor(
            ReasoningFactor::Growth,
            s.growth,
            stance(s.growth, 60, 40, ["Strong", "Weak", "Moderate"]),
            growth_points(c),
        ),
        factor(
            ReasoningFactor::Macro,
            Metric::Unavailable,
            c.macro_profile.sector_outlook.to_label().to_string(),
            macro_points(c),
        ),
    ]
}

fn executive_summary(c: &NarrativeContext<'_>) -> String {
    let name = c.company_name();
    match c.verdict.composite {
        Metric::Available(score) => format!(
            "{} ({}) receives an overall score of {:.1}/100, a {} recommendation with {} confidence. \
             The assessment combines technical indicators, fundamental metrics, DCF and relative \
             valuation, and sector conditions, and points to a {} long-term outlook with {} risk.",
            name,
            c.symbol,
            score,
            c.verdict.recommendation.to_label(),
            c.verdict.confidence.level.to_label(),
            outlook_text(c.outlook),
            risk_text(c.risk_level)
        ),
        Metric::Unavailable => format!(
            "{} ({}) could not be scored: none of the sub-scores had enough data. \
             The recommendation defaults to {}.",
            name,
            c.symbol,
            c.verdict.recommendation.to_label()
        ),
    }
}

fn investment_thesis(c: &NarrativeContext<'_>, signals: &NarrativeSignals) -> String {
    let name = c.company_name();
    let s = c.scores;
    let mut parts = Vec::new();

    match c.verdict.composite.get() {
        Some(score) if score >= 65.0 => {
            parts.push(format!(
                "{} presents a compelling opportunity, with a fundamental score of {}.",
                name,
                score_text(s.fundamental)
            ));
            if s.technical.get().map_or(false, |t| t > 60) {
                parts.push(format!("Technical analysis supports a bullish view at {}.", score_text(s.technical)));
            }
            if s.value.get().map_or(false, |v| v > 60) {
                parts.push(format!("Valuation looks attractive with a value score of {}.", score_text(s.value)));
            }
        }
        Some(score) if score >= 45.0 => {
            parts.push(format!("{} has a mixed profile with both positive and negative factors.", name));
            parts.push(format!(
                "Fundamentals score {}, but there are concerns that limit upside.",
                score_text(s.fundamental)
            ));
            parts.push("Opportunities and risks should be weighed carefully.".to_string());
        }
        Some(_) => {
            parts.push(format!("{} faces significant challenges that limit its appeal.", name));
            parts.push(format!(
                "With a fundamental score of {} and a technical score of {}, the stock shows weakness.",
                score_text(s.fundamental),
                score_text(s.technical)
            ));
        }
        None => {
            parts.push(format!("There is not enough data to form an investment thesis for {}.", name));
        }
    }

    if !signals.opportunities.is_empty() {
        let top: Vec<&str> = signals.opportunities.iter().take(3).map(String::as_str).collect();
        parts.push(format!("Key opportunities: {}.", top.join(", ")));
    }
    parts.join(" ")
}

fn risk_summary(c: &NarrativeContext<'_>, signals: &NarrativeSignals, risk: &RiskAssessment) -> String {
    let mut parts = vec![format!(
        "Risk level is {} with a risk score of {}/100.",
        risk_text(c.risk_level),
        risk.score
    )];
    parts.extend(risk.reasoning.iter().take(2).map(|r| format!("{}.", r)));
    if !signals.risk_factors.is_empty() {
        let top: Vec<&str> = signals.risk_factors.iter().take(3).map(String::as_str).collect();
        parts.push(format!("Main risks: {}.", top.join("; ")));
    }
    parts.join(" ")
}

fn conclusion(c: &NarrativeContext<'_>, signals: &NarrativeSignals) -> String {
    let s = c.scores;
    let mut parts = vec![
        format!(
            "{} ({}) receives an overall score of {}, resulting in a {} recommendation.",
            c.company_name(),
            c.symbol,
            composite_text(c.verdict.composite),
            c.verdict.recommendation.to_label()
        ),
        format!(
            "Technical {}, fundamental {}, momentum {}, value {}, growth {}.",
            score_text(s.technical),
            score_text(s.fundamental),
            score_text(s.momentum),
            score_text(s.value),
            score_text(s.growth)
        ),
    ];

    if let Some(target) = c.price_target.value() {
        let direction = if target.value >= c.current_price { "upside" } else { "downside" };
        parts.push(format!(
            "The price target of ${:.2} represents {:.1}% {} from the current price of ${:.2}.",
            target.value,
            target.upside_pct.abs(),
            direction,
            c.current_price
        ));
    }

    parts.push(format!(
        "Over a {} horizon this is a {} opportunity with {} risk.",
        TIME_HORIZON,
        outlook_text(c.outlook),
        risk_text(c.risk_level)
    ));

    let watch = if signals.risk_factors.is_empty() {
        "general market conditions".to_string()
    } else {
        signals.risk_factors.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
    };
    parts.push(format!("Factors to monitor: {}.", watch));

    parts.join(" ")
}

/// Assemble the full narrative from the rule output and the risk assessment.
pub fn compose(ctx: &NarrativeContext<'_>, signals: NarrativeSignals, risk: &RiskAssessment) -> Narrative {
    let executive_summary = executive_summary(ctx);
    let factor_reasoning = factor_reasoning(ctx);
    let risk_summary = risk_summary(ctx, &signals, risk);
    let investment_thesis = investment_thesis(ctx, &signals);
    let conclusion = conclusion(ctx, &signals);

    Narrative {
        executive_summary,
        factor_reasoning,
        risk_summary,
        investment_thesis,
        conclusion,
        technical_signals: signals.technical_signals,
        fundamental_signals: signals.fundamental_signals,
        opportunities: signals.opportunities,
        risk_factors: signals.risk_factors,
    }
}
