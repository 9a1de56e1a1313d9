use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{AnalysisError, PriceBar};

/// Validated price history: strictly ascending, one bar per calendar day.
///
/// Built only through [`PriceSeries::normalize`]; there are no mutating accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
    /// Simple return per bar, aligned with `bars` (index 0 is always `None`)
    returns: Vec<Option<f64>>,
}

impl PriceSeries {
    /// De-duplicate (last row for a date wins), sort and validate raw rows.
    ///
    /// A superseded same-day row is dropped before validation, so a later correction
    /// replaces a malformed row. Any malformed surviving bar rejects the whole series. An empty input is reported as
    /// `InsufficientData` since not even a current price exists.
    pub fn normalize(raw: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        if raw.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "Price history is empty".to_string(),
            ));
        }

        let raw_len = raw.len();
        let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
        for bar in raw {
            by_date.insert(bar.date, bar);
        }
        let bars: Vec<PriceBar> = by_date.into_values().collect();
        for bar in &bars {
            bar.validate()?;
        }

        let duplicates = raw_len - bars.len();
        if duplicates > 0 {
            tracing::debug!("Dropped {} duplicate same-day bars (kept last seen)", duplicates);
        }

        let mut returns = Vec::with_capacity(bars.len());
        returns.push(None);
        for w in bars.windows(2) {
            let prev = w[0].close;
            returns.push(if prev > 0.0 { Some(w[1].close / prev - 1.0) } else { None });
        }

        Ok(Self { bars, returns })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// First bar; normalization guarantees at least one.
    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    /// Most recent bar; normalization guarantees at least one.
    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn current_price(&self) -> f64 {
        self.last().close
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// Per-bar simple returns aligned with `bars()`.
    pub fn bar_returns(&self) -> &[Option<f64>] {
        &self.returns
    }

    /// Defined daily returns in chronological order.
    pub fn returns(&self) -> Result<Vec<f64>, AnalysisError> {
        if self.bars.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "Returns need at least 2 bars, have {}",
                self.bars.len()
            )));
        }
        Ok(self.returns.iter().flatten().copied().collect())
    }

    /// Bars dated on or after `start`.
    pub fn window_since(&self, start: NaiveDate) -> &[PriceBar] {
        let idx = self.bars.partition_point(|b| b.date < start);
        &self.bars[idx..]
    }
}
