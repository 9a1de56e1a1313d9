//! Sub-score computation.
//!
//! Each sub-score is a points rubric: every input that is available contributes its
//! earned points and its maximum. The score is `earned / possible * 100` over the
//! available inputs only, so a missing field lowers confidence rather than the score.

use analysis_core::{FundamentalsSnapshot, Metric, ScoreWeights};
use fundamental_analysis::{ValuationClass, ValuationSummary};
use quant_analysis::PerformanceSummary;
use serde::{Deserialize, Serialize};
use technical_analysis::{IndicatorSet, RsiZone, TrendAlignment, TrendDirection, VolumeLevel};

/// The five 0-100 sub-scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub technical: Metric<u8>,
    pub fundamental: Metric<u8>,
    pub momentum: Metric<u8>,
    pub value: Metric<u8>,
    pub growth: Metric<u8>,
}

impl ScoreSet {
    /// Sub-scores in the same order as [`ScoreWeights::as_array`].
    pub fn as_array(&self) -> [Metric<u8>; 5] {
        [self.technical, self.fundamental, self.momentum, self.value, self.growth]
    }

    pub fn available_count(&self) -> usize {
        self.as_array().iter().filter(|s| s.is_available()).count()
    }
}

/// Everything the rubrics read
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub indicators: &'a IndicatorSet,
    pub performance: &'a PerformanceSummary,
    pub valuation: &'a ValuationSummary,
    pub fundamentals: &'a FundamentalsSnapshot,
}

#[derive(Debug, Default)]
struct Rubric {
    earned: f64,
    possible: f64,
}

impl Rubric {
    fn add(&mut self, points: f64, max: f64) {
        self.earned += points;
        self.possible += max;
    }

    /// Add a block only when its input is available.
    fn add_if(&mut self, points: Option<f64>, max: f64) {
        if let Some(p) = points {
            self.add(p, max);
        }
    }

    fn finish(self) -> Metric<u8> {
        if self.possible <= 0.0 {
            return Metric::Unavailable;
        }
        let pct = (self.earned / self.possible * 100.0).clamp(0.0, 100.0);
        Metric::Available(pct.round() as u8)
    }
}

fn positive(metric: Metric<f64>) -> Option<f64> {
    metric.get().filter(|v| *v > 0.0)
}

/// First tier whose threshold `value` exceeds, else `floor`.
fn above(value: f64, tiers: &[(f64, f64)], floor: f64) -> f64 {
    tiers
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(floor)
}

/// First tier whose threshold `value` is under, else `floor`.
fn below(value: f64, tiers: &[(f64, f64)], floor: f64) -> f64 {
    tiers
        .iter()
        .find(|(threshold, _)| value < *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(floor)
}

// Technical
const RSI_MAX: f64 = 20.0;
const SMA_LONG_POINTS: (f64, f64) = (10.0, 2.0);
const SMA_MEDIUM_POINTS: (f64, f64) = (8.0, 3.0);
const SMA_SHORT_POINTS: (f64, f64) = (7.0, 3.0);
const UPTREND_BONUS: f64 = 5.0;
const MACD_MAX: f64 = 15.0;
const MACD_MAGNITUDE_MAX: f64 = 5.0;
const BOLLINGER_MAX: f64 = 10.0;
const STOCHASTIC_MAX: f64 = 10.0;

pub fn technical_score(ind: &IndicatorSet) -> Metric<u8> {
    let mut r = Rubric::default();

    r.add_if(
        ind.rsi_zone.get().map(|zone| match zone {
            RsiZone::Oversold => 20.0,
            RsiZone::Neutral => 15.0,
            RsiZone::Overbought => 5.0,
        }),
        RSI_MAX,
    );

    for (reading, (up, down)) in [
        (&ind.sma_long, SMA_LONG_POINTS),
        (&ind.sma_medium, SMA_MEDIUM_POINTS),
        (&ind.sma_short, SMA_SHORT_POINTS),
    ] {
        r.add_if(reading.price_vs_pct.get().map(|pct| if pct > 0.0 { up } else { down }), up);
    }
    r.add_if(
        ind.trend_alignment
            .get()
            .map(|t| if t == TrendAlignment::Uptrend { UPTREND_BONUS } else { 0.0 }),
        UPTREND_BONUS,
    );

    r.add_if(
        ind.macd_histogram.get().map(|hist| {
            if hist > 0.0 {
                let magnitude = if ind.current_price > 0.0 {
                    (hist.abs() / ind.current_price * 1000.0).min(MACD_MAGNITUDE_MAX)
                } else {
                    0.0
                };
                10.0 + magnitude
            } else {
                3.0
            }
        }),
        MACD_MAX,
    );

    r.add_if(
        ind.bollinger_percent_b.get().map(|b| {
            if (20.0..=80.0).contains(&b) {
                10.0
            } else if b < 20.0 {
                8.0
            } else {
                5.0
            }
        }),
        BOLLINGER_MAX,
    );

    if let (Some(k), Some(d)) = (ind.stochastic_k.get(), ind.stochastic_d.get()) {
        let points = if k > d && k < 80.0 {
            8.0
        } else if k < 20.0 {
            7.0
        } else if k < d && k > 20.0 {
            3.0
        } else {
            5.0
        };
        r.add(points, STOCHASTIC_MAX);
    }

    r.finish()
}

pub fn fundamental_score(f: &FundamentalsSnapshot) -> Metric<u8> {
    let mut r = Rubric::default();

    r.add_if(f.profit_margin.get().map(|v| above(v, &[(0.15, 8.0), (0.0, 5.0)], 1.0)), 8.0);
    r.add_if(f.return_on_equity.get().map(|v| above(v, &[(0.15, 6.0), (0.0, 3.0)], 1.0)), 6.0);
    r.add_if(f.return_on_assets.get().map(|v| above(v, &[(0.08, 6.0), (0.0, 3.0)], 1.0)), 6.0);
    r.add_if(f.operating_margin.get().map(|v| above(v, &[(0.20, 5.0), (0.0, 3.0)], 1.0)), 5.0);
    r.add_if(f.debt_to_equity.get().map(|v| below(v, &[(1.0, 10.0), (2.0, 7.0)], 3.0)), 10.0);
    r.add_if(
        f.current_ratio.get().map(|v| {
            if (1.5..=3.0).contains(&v) {
                10.0
            } else if v >= 1.0 {
                6.0
            } else {
                2.0
            }
        }),
        10.0,
    );
    r.add_if(f.revenue_growth.get().map(|v| above(v, &[(0.10, 8.0), (0.0, 5.0)], 1.0)), 8.0);
    r.add_if(f.earnings_growth.get().map(|v| above(v, &[(0.15, 7.0), (0.0, 4.0)], 1.0)), 7.0);

    r.finish()
}

pub fn momentum_score(ind: &IndicatorSet, perf: &PerformanceSummary) -> Metric<u8> {
    let mut r = Rubric::default();

    let recent = ind.recent_change().and_then(|c| c.change_pct.get());
    r.add_if(recent.map(|v| above(v, &[(10.0, 40.0), (0.0, 28.0), (-10.0, 14.0)], 4.0)), 40.0);

    r.add_if(
        perf.one_year
            .value()
            .and_then(|w| w.return_pct.get())
            .map(|v| above(v, &[(20.0, 20.0), (0.0, 12.0)], 3.0)),
        20.0,
    );

    // Volume confirms the direction of the shortest configured change
    let direction = ind
        .price_changes
        .iter()
        .min_by_key(|c| c.period)
        .and_then(|c| c.change_pct.get());
    r.add_if(
        ind.volume_level.get().map(|level| match (level, direction) {
            (VolumeLevel::Elevated, Some(d)) if d > 0.0 => 20.0,
            (VolumeLevel::Elevated, Some(d)) if d < 0.0 => 4.0,
            (VolumeLevel::Depressed, _) => 8.0,
            _ => 12.0,
        }),
        20.0,
    );

    r.add_if(
        ind.rsi_trend.get().map(|t| match t {
            TrendDirection::Rising => 20.0,
            TrendDirection::Flat => 12.0,
            TrendDirection::Falling => 4.0,
        }),
        20.0,
    );

    r.finish()
}

pub fn value_score(valuation: &ValuationSummary) -> Metric<u8> {
    let mut r = Rubric::default();

    r.add_if(
        valuation.relative.value().map(|rv| match rv.overall {
            ValuationClass::Cheap => 40.0,
            ValuationClass::Fair => 24.0,
            ValuationClass::Expensive => 8.0,
        }),
        40.0,
    );

    r.add_if(
        valuation
            .dcf
            .value()
            .and_then(|d| d.upside_pct.get())
            .map(|u| above(u, &[(15.0, 40.0), (0.0, 28.0), (-15.0, 16.0)], 4.0)),
        40.0,
    );

    r.add_if(
        valuation
            .analyst_upside_pct
            .get()
            .map(|u| above(u, &[(20.0, 20.0), (10.0, 15.0), (0.0, 10.0)], 4.0)),
        20.0,
    );

    r.finish()
}

pub fn growth_score(f: &FundamentalsSnapshot) -> Metric<u8> {
    let mut r = Rubric::default();

    r.add_if(
        f.revenue_growth.get().map(|v| above(v, &[(0.20, 30.0), (0.10, 20.0), (0.0, 12.0)], 3.0)),
        30.0,
    );
    r.add_if(
        f.earnings_growth.get().map(|v| above(v, &[(0.25, 30.0), (0.15, 20.0), (0.0, 12.0)], 3.0)),
        30.0,
    );
    r.add_if(
        positive(f.peg_ratio).map(|v| below(v, &[(1.0, 20.0), (1.5, 15.0)], 5.0)),
        20.0,
    );
    if let (Some(forward), Some(trailing)) = (positive(f.forward_pe), positive(f.trailing_pe)) {
        r.add(if forward < trailing { 20.0 } else { 8.0 }, 20.0);
    }

    r.finish()
}

pub fn score_all(inputs: &ScoreInputs<'_>) -> ScoreSet {
    ScoreSet {
        technical: technical_score(inputs.indicators),
        fundamental: fundamental_score(inputs.fundamentals),
        momentum: momentum_score(inputs.indicators, inputs.performance),
        value: value_score(inputs.valuation),
        growth: growth_score(inputs.fundamentals),
    }
}

/// Weighted mean of the available sub-scores, renormalized over their weights.
pub fn composite(scores: &ScoreSet, weights: &ScoreWeights) -> Metric<f64> {
    let (weighted, total_weight) = scores
        .as_array()
        .iter()
        .zip(weights.as_array())
        .filter_map(|(score, w)| score.get().map(|s| (s as f64 * w, w)))
        .fold((0.0, 0.0), |(acc, tw), (ws, w)| (acc + ws, tw + w));

    if total_weight <= 0.0 {
        return Metric::Unavailable;
    }
    Metric::Available(weighted / total_weight)
}
