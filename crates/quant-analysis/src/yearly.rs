use std::collections::BTreeMap;

use analysis_core::{stats, Metric, PriceBar};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Aggregate of one calendar year of bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRow {
    pub year: i32,
    /// Open of the first bar in the year
    pub open: f64,
    /// Close of the last bar in the year
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub bar_count: usize,
    /// `(close / open - 1) * 100`
    pub return_pct: Metric<f64>,
}

impl YearlyRow {
    fn start(bar: &PriceBar) -> Self {
        Self {
            year: bar.date.year(),
            open: bar.open,
            close: bar.close,
            high: bar.high,
            low: bar.low,
            volume: bar.volume,
            bar_count: 1,
            return_pct: Metric::Unavailable,
        }
    }

    fn extend(&mut self, bar: &PriceBar) {
        self.close = bar.close;
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.volume = self.volume.saturating_add(bar.volume);
        self.bar_count += 1;
    }
}

/// One row per calendar year present, ascending. Expects bars sorted by date.
pub fn yearly_rows(bars: &[PriceBar]) -> Vec<YearlyRow> {
    let mut rows: BTreeMap<i32, YearlyRow> = BTreeMap::new();

    for bar in bars {
        rows.entry(bar.date.year())
            .and_modify(|row| row.extend(bar))
            .or_insert_with(|| YearlyRow::start(bar));
    }

    rows.into_values()
        .map(|mut row| {
            row.return_pct = stats::pct_change(row.open, row.close).into();
            row
        })
        .collect()
}
