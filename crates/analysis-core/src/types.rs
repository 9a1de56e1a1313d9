use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, RecommendationThresholds};

/// Daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// An input row before normalization. Same shape as a validated bar.
pub type RawBar = PriceBar;

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self { date, open, high, low, close, volume }
    }

    /// Reject bars that cannot come from a real trading session.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidInput(format!(
                    "{}: {} is not a finite number",
                    self.date, name
                )));
            }
            if value < 0.0 {
                return Err(AnalysisError::InvalidInput(format!(
                    "{}: negative {} ({})",
                    self.date, name, value
                )));
            }
        }

        if self.high < self.open.max(self.close).max(self.low) {
            return Err(AnalysisError::InvalidInput(format!(
                "{}: high {} is below open/close/low",
                self.date, self.high
            )));
        }
        if self.low > self.open.min(self.close).min(self.high) {
            return Err(AnalysisError::InvalidInput(format!(
                "{}: low {} is above open/close/high",
                self.date, self.low
            )));
        }

        Ok(())
    }
}

/// Discrete investment recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Map a 0-100 composite onto a recommendation. Monotonic in `score`.
    pub fn from_composite(score: f64, thresholds: &RecommendationThresholds) -> Self {
        match score {
            s if s >= thresholds.strong_buy => Recommendation::StrongBuy,
            s if s >= thresholds.buy => Recommendation::Buy,
            s if s >= thresholds.hold => Recommendation::Hold,
            s if s >= thresholds.sell => Recommendation::Sell,
            _ => Recommendation::StrongSell,
        }
    }

    /// Human-readable label for the recommendation
    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }

    /// Ordinal rank, higher is more bullish.
    pub fn rank(&self) -> u8 {
        match self {
            Recommendation::StrongBuy => 4,
            Recommendation::Buy => 3,
            Recommendation::Hold => 2,
            Recommendation::Sell => 1,
            Recommendation::StrongSell => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), open, high, low, close, 1_000)
    }

    #[test]
    fn test_valid_bar() {
        assert!(bar(10.0, 12.0, 9.0, 11.0).validate().is_ok());
        // A flat bar is legal
        assert!(bar(10.0, 10.0, 10.0, 10.0).validate().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = bar(-1.0, 12.0, 0.0, 11.0).validate().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_impossible_high_low_rejected() {
        assert!(bar(10.0, 9.5, 9.0, 11.0).validate().is_err());
        assert!(bar(10.0, 12.0, 10.5, 11.0).validate().is_err());
        assert!(bar(10.0, 12.0, f64::NAN, 11.0).validate().is_err());
    }

    #[test]
    fn test_recommendation_bands() {
        let t = RecommendationThresholds::default();
        assert_eq!(Recommendation::from_composite(80.0, &t), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_composite(79.9, &t), Recommendation::Buy);
        assert_eq!(Recommendation::from_composite(65.0, &t), Recommendation::Buy);
        assert_eq!(Recommendation::from_composite(64.0, &t), Recommendation::Hold);
        assert_eq!(Recommendation::from_composite(45.0, &t), Recommendation::Hold);
        assert_eq!(Recommendation::from_composite(44.0, &t), Recommendation::Sell);
        assert_eq!(Recommendation::from_composite(30.0, &t), Recommendation::Sell);
        assert_eq!(Recommendation::from_composite(29.9, &t), Recommendation::StrongSell);
    }

    #[test]
    fn test_recommendation_is_monotonic() {
        let t = RecommendationThresholds::default();
        let mut prev = Recommendation::from_composite(0.0, &t).rank();
        for i in 1..=100 {
            let rank = Recommendation::from_composite(i as f64, &t).rank();
            assert!(rank >= prev);
            prev = rank;
        }
    }
}
