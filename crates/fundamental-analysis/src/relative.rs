use analysis_core::{FundamentalsSnapshot, Metric, RatioBand, ValuationBands};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationClass {
    Cheap,
    Fair,
    Expensive,
}

impl ValuationClass {
    pub fn to_label(&self) -> &'static str {
        match self {
            ValuationClass::Cheap => "cheap",
            ValuationClass::Fair => "fairly valued",
            ValuationClass::Expensive => "expensive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAssessment {
    pub value: f64,
    /// Where the value came from: reported by the provider or derived from price data
    pub derived: bool,
    pub class: ValuationClass,
    /// `value / market_average * 100`
    pub pct_of_market: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeValuation {
    pub price_to_earnings: Metric<RatioAssessment>,
    pub price_to_book: Metric<RatioAssessment>,
    pub price_to_sales: Metric<RatioAssessment>,
    pub overall: ValuationClass,
    /// Mean premium (+) or discount (-) to the market averages, in percent
    pub premium_discount_pct: f64,
    pub ratios_used: usize,
}

fn classify(value: f64, band: &RatioBand) -> ValuationClass {
    if value < band.low {
        ValuationClass::Cheap
    } else if value > band.high {
        ValuationClass::Expensive
    } else {
        ValuationClass::Fair
    }
}

fn assess(reported: Metric<f64>, derived: Option<f64>, band: &RatioBand) -> Metric<RatioAssessment> {
    let (value, is_derived) = match reported.filter(|v| *v > 0.0) {
        Metric::Available(v) => (v, false),
        Metric::Unavailable => match derived.filter(|v| v.is_finite() && *v > 0.0) {
            Some(v) => (v, true),
            None => return Metric::Unavailable,
        },
    };

    Metric::Available(RatioAssessment {
        value,
        derived: is_derived,
        class: classify(value, band),
        pct_of_market: value / band.market_average * 100.0,
    })
}

/// P/E from price and trailing EPS
fn derived_pe(price: f64, eps: Metric<f64>) -> Option<f64> {
    let eps = eps.get()?;
    if eps > 0.0 && price > 0.0 {
        Some(price / eps)
    } else {
        None
    }
}

/// P/S from market cap and trailing revenue
fn derived_ps(market_cap: Metric<f64>, revenue: Metric<f64>) -> Option<f64> {
    let revenue = revenue.get()?;
    if revenue > 0.0 {
        market_cap.get().map(|cap| cap / revenue)
    } else {
        None
    }
}

/// Winner of a strict plurality; ties resolve to `Fair`.
fn plurality(classes: &[ValuationClass]) -> ValuationClass {
    let count = |c: ValuationClass| classes.iter().filter(|&&x| x == c).count();
    let counts = [
        (ValuationClass::Cheap, count(ValuationClass::Cheap)),
        (ValuationClass::Fair, count(ValuationClass::Fair)),
        (ValuationClass::Expensive, count(ValuationClass::Expensive)),
    ];

    let best = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let mut leaders = counts.iter().filter(|(_, n)| *n == best);
    match (leaders.next(), leaders.next()) {
        (Some((class, _)), None) => *class,
        _ => ValuationClass::Fair,
    }
}

/// Compare trailing multiples with the configured market bands.
///
/// Missing or non-positive ratios sit out the vote. P/E and P/S fall back to values
/// derived from EPS, market cap and revenue when the provider left them out.
pub fn relative_valuation(
    fundamentals: &FundamentalsSnapshot,
    current_price: f64,
    bands: &ValuationBands,
) -> Metric<RelativeValuation> {
    let price_to_earnings = assess(
        fundamentals.trailing_pe,
        derived_pe(current_price, fundamentals.trailing_eps),
        &bands.price_to_earnings,
    );
    let price_to_book = assess(fundamentals.price_to_book, None, &bands.price_to_book);
    let price_to_sales = assess(
        fundamentals.price_to_sales,
        derived_ps(fundamentals.market_cap, fundamentals.total_revenue),
        &bands.price_to_sales,
    );

    let assessed: Vec<&RatioAssessment> = [&price_to_earnings, &price_to_book, &price_to_sales]
        .into_iter()
        .filter_map(|m| m.value())
        .collect();

    if assessed.is_empty() {
        return Metric::Unavailable;
    }

    let classes: Vec<ValuationClass> = assessed.iter().map(|a| a.class).collect();
    let premium_discount_pct = assessed.iter().map(|a| a.pct_of_market - 100.0).sum::<f64>() / 3.0;
    let ratios_used = assessed.len();

    Metric::Available(RelativeValuation {
        overall: plurality(&classes),
        premium_discount_pct,
        ratios_used,
        price_to_earnings,
        price_to_book,
        price_to_sales,
    })
}
