use analysis_core::{stats, Metric, PriceBar, PriceSeries};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::yearly::{yearly_rows, YearlyRow};

/// A close price and the date it printed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub value: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeStats {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub years_of_data: f64,
    pub start_price: f64,
    pub current_price: f64,
    pub high: PricePoint,
    pub low: PricePoint,
    pub mean_close: Metric<f64>,
    pub median_close: Metric<f64>,
    pub std_dev_close: Metric<f64>,
    pub total_return_pct: Metric<f64>,
    /// Largest peak-to-trough decline of the close, in percent
    pub max_drawdown_pct: Metric<f64>,
}

/// High, low and return over a trailing calendar window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub years: u32,
    pub start_date: NaiveDate,
    pub high: PricePoint,
    pub low: PricePoint,
    pub return_pct: Metric<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub all_time: AllTimeStats,
    pub one_year: Metric<WindowStats>,
    pub five_year: Metric<WindowStats>,
    /// Ascending by year
    pub yearly: Vec<YearlyRow>,
}

/// Highest and lowest close; the earliest bar wins ties.
fn extremes(bars: &[PriceBar]) -> Option<(PricePoint, PricePoint)> {
    let first = bars.first()?;
    let start = PricePoint { value: first.close, date: first.date };

    Some(bars.iter().skip(1).fold((start, start), |(mut high, mut low), bar| {
        if bar.close > high.value {
            high = PricePoint { value: bar.close, date: bar.date };
        }
        if bar.close < low.value {
            low = PricePoint { value: bar.close, date: bar.date };
        }
        (high, low)
    }))
}

fn first_to_last_return(bars: &[PriceBar]) -> Metric<f64> {
    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) if bars.len() >= 2 => stats::pct_change(first.close, last.close).into(),
        _ => Metric::Unavailable,
    }
}

/// Maximum drawdown of a price path, in percent.
pub fn max_drawdown(prices: &[f64]) -> Option<f64> {
    if prices.len() < 2 {
        return None;
    }

    let mut max_price = prices[0];
    let mut max_dd = 0.0;

    for &price in prices {
        if price > max_price {
            max_price = price;
        }

        if max_price > 0.0 {
            let drawdown = (max_price - price) / max_price;
            if drawdown > max_dd {
                max_dd = drawdown;
            }
        }
    }

    Some(max_dd * 100.0)
}

/// Summarizes a price history over its full span, trailing windows and calendar years.
#[derive(Debug, Clone, Default)]
pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, series: &PriceSeries) -> PerformanceSummary {
        PerformanceSummary {
            all_time: self.all_time(series),
            one_year: self.trailing_window(series, 1),
            five_year: self.trailing_window(series, 5),
            yearly: yearly_rows(series.bars()),
        }
    }

    fn all_time(&self, series: &PriceSeries) -> AllTimeStats {
        let bars = series.bars();
        let closes = series.closes();
        let first = series.first();
        let last = series.last();

        let (high, low) = extremes(bars).unwrap_or((
            PricePoint { value: last.close, date: last.date },
            PricePoint { value: last.close, date: last.date },
        ));

        AllTimeStats {
            start_date: first.date,
            end_date: last.date,
            bar_count: bars.len(),
            years_of_data: (last.date - first.date).num_days() as f64 / 365.25,
            start_price: first.close,
            current_price: last.close,
            high,
            low,
            mean_close: stats::mean(&closes).into(),
            median_close: stats::median(&closes).into(),
            std_dev_close: stats::sample_std_dev(&closes).into(),
            total_return_pct: first_to_last_return(bars),
            max_drawdown_pct: max_drawdown(&closes).into(),
        }
    }

    /// Stats since `last_date - years`, reported only when the history reaches back
    /// that far.
    fn trailing_window(&self, series: &PriceSeries, years: u32) -> Metric<WindowStats> {
        let end = series.last().date;
        let Some(start) = end.checked_sub_months(Months::new(years * 12)) else {
            return Metric::Unavailable;
        };
        if series.first().date > start {
            return Metric::Unavailable;
        }

        let window = series.window_since(start);
        match extremes(window) {
            Some((high, low)) => Metric::Available(WindowStats {
                years,
                start_date: start,
                high,
                low,
                return_pct: first_to_last_return(window),
            }),
            None => Metric::Unavailable,
        }
    }
}
