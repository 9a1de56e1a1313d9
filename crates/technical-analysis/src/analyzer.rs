use analysis_core::{IndicatorConfig, Metric, PriceSeries};
use serde::{Deserialize, Serialize};

use crate::indicators::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

/// Direction of RSI over the configured lookback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

/// Ordering of price against the short, medium and long SMAs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendAlignment {
    Uptrend,
    Downtrend,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdCrossover {
    Bullish,
    Bearish,
    NoCross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeLevel {
    Elevated,
    Normal,
    Depressed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaReading {
    pub period: usize,
    pub value: Metric<f64>,
    /// `(price / sma - 1) * 100`
    pub price_vs_pct: Metric<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub period: usize,
    pub change_pct: Metric<f64>,
}

/// Latest value of every indicator. Each field is independently available or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub current_price: f64,

    pub rsi: Metric<f64>,
    pub rsi_zone: Metric<RsiZone>,
    pub rsi_trend: Metric<TrendDirection>,

    pub sma_short: SmaReading,
    pub sma_medium: SmaReading,
    pub sma_long: SmaReading,
    pub trend_alignment: Metric<TrendAlignment>,

    pub ema_fast: Metric<f64>,
    pub ema_slow: Metric<f64>,

    pub macd: Metric<f64>,
    pub macd_signal: Metric<f64>,
    pub macd_histogram: Metric<f64>,
    pub macd_crossover: Metric<MacdCrossover>,

    pub bollinger_upper: Metric<f64>,
    pub bollinger_middle: Metric<f64>,
    pub bollinger_lower: Metric<f64>,
    pub bollinger_percent_b: Metric<f64>,
    pub bollinger_bandwidth: Metric<f64>,

    pub stochastic_k: Metric<f64>,
    pub stochastic_d: Metric<f64>,

    pub atr: Metric<f64>,
    /// Annualized, as a fraction
    pub volatility: Metric<f64>,

    pub current_volume: f64,
    pub average_volume: Metric<f64>,
    pub volume_ratio: Metric<f64>,
    pub volume_level: Metric<VolumeLevel>,

    pub obv: Metric<f64>,
    pub momentum: Metric<f64>,
    pub price_changes: Vec<PriceChange>,
}

impl IndicatorSet {
    /// Change over the longest configured window.
    pub fn recent_change(&self) -> Option<&PriceChange> {
        self.price_changes.iter().max_by_key(|c| c.period)
    }

    pub fn price_change(&self, period: usize) -> Metric<f64> {
        self.price_changes
            .iter()
            .find(|c| c.period == period)
            .map(|c| c.change_pct)
            .unwrap_or_default()
    }

    /// Names of headline indicators that could not be computed.
    pub fn unavailable(&self) -> Vec<&'static str> {
        [
            ("rsi", self.rsi.is_available()),
            ("sma_short", self.sma_short.value.is_available()),
            ("sma_medium", self.sma_medium.value.is_available()),
            ("sma_long", self.sma_long.value.is_available()),
            ("macd", self.macd_histogram.is_available()),
            ("bollinger", self.bollinger_percent_b.is_available()),
            ("stochastic", self.stochastic_d.is_available()),
            ("atr", self.atr.is_available()),
            ("volatility", self.volatility.is_available()),
            ("volume_ratio", self.volume_ratio.is_available()),
        ]
        .into_iter()
        .filter(|(_, available)| !available)
        .map(|(name, _)| name)
        .collect()
    }
}

fn last(values: &[f64]) -> Metric<f64> {
    values.last().copied().map(Metric::finite).unwrap_or_default()
}

/// Builds an [`IndicatorSet`] from a normalized series.
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(IndicatorConfig::default())
    }
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Compute every indicator the series is long enough for. Never fails.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorSet {
        let cfg = &self.config;
        let closes = series.closes();
        let volumes = series.volumes();
        let bars = series.bars();
        let price = series.current_price();

        // RSI
        let rsi_values = rsi(&closes, cfg.rsi_period);
        let rsi_last = last(&rsi_values);
        let rsi_zone = rsi_last.map(|v| {
            if v > cfg.rsi_overbought {
                RsiZone::Overbought
            } else if v < cfg.rsi_oversold {
                RsiZone::Oversold
            } else {
                RsiZone::Neutral
            }
        });
        let rsi_trend = if cfg.rsi_trend_lookback > 0 && rsi_values.len() > cfg.rsi_trend_lookback {
            let now = rsi_values[rsi_values.len() - 1];
            let then = rsi_values[rsi_values.len() - 1 - cfg.rsi_trend_lookback];
            Metric::Available(match now - then {
                d if d > 1.0 => TrendDirection::Rising,
                d if d < -1.0 => TrendDirection::Falling,
                _ => TrendDirection::Flat,
            })
        } else {
            Metric::Unavailable
        };

        // Moving averages
        let sma_reading = |period: usize| {
            let value = last(&sma(&closes, period));
            SmaReading {
                period,
                value,
                price_vs_pct: value.filter(|s| *s > 0.0).map(|s| (price / s - 1.0) * 100.0),
            }
        };
        let sma_short = sma_reading(cfg.sma_short);
        let sma_medium = sma_reading(cfg.sma_medium);
        let sma_long = sma_reading(cfg.sma_long);

        let trend_alignment = match (sma_short.value, sma_medium.value, sma_long.value) {
            (Metric::Available(s), Metric::Available(m), Metric::Available(l)) => {
                Metric::Available(if price > s && s > m && m > l {
                    TrendAlignment::Uptrend
                } else if price < s && s < m && m < l {
                    TrendAlignment::Downtrend
                } else {
                    TrendAlignment::Mixed
                })
            }
            _ => Metric::Unavailable,
        };

        let ema_fast = last(&ema(&closes, cfg.ema_fast));
        let ema_slow = last(&ema(&closes, cfg.ema_slow));

        // MACD
        let macd_result = macd(&closes, cfg.ema_fast, cfg.ema_slow, cfg.macd_signal);
        let hist = &macd_result.histogram;
        let macd_crossover = if hist.len() >= 2 {
            let prev = hist[hist.len() - 2];
            let now = hist[hist.len() - 1];
            Metric::Available(if prev <= 0.0 && now > 0.0 {
                MacdCrossover::Bullish
            } else if prev >= 0.0 && now < 0.0 {
                MacdCrossover::Bearish
            } else {
                MacdCrossover::NoCross
            })
        } else {
            Metric::Unavailable
        };

        // Bollinger
        let bb = bollinger_bands(&closes, cfg.bollinger_period, cfg.bollinger_std_dev);
        let (bollinger_upper, bollinger_middle, bollinger_lower) =
            (last(&bb.upper), last(&bb.middle), last(&bb.lower));
        let (bollinger_percent_b, bollinger_bandwidth): (Metric<f64>, Metric<f64>) =
            match (bollinger_upper, bollinger_middle, bollinger_lower) {
                (Metric::Available(u), Metric::Available(m), Metric::Available(l)) => {
                    (percent_b(price, u, l).into(), bandwidth(u, m, l).into())
                }
                _ => (Metric::Unavailable, Metric::Unavailable),
            };

        // Stochastic
        let stoch = stochastic(bars, cfg.stochastic_k, cfg.stochastic_d);
        let stochastic_k: Metric<f64> = stoch.k.last().copied().flatten().into();
        let stochastic_d: Metric<f64> = stoch.d.last().copied().flatten().into();

        let atr_value = last(&atr(bars, cfg.atr_period));

        let volatility: Metric<f64> = match series.returns() {
            Ok(returns) => {
                Metric::from(annualized_volatility(&returns, cfg.volatility_window, cfg.trading_days_per_year))
                    .and_then(Metric::finite)
            }
            Err(e) => {
                tracing::debug!("Volatility unavailable: {}", e);
                Metric::Unavailable
            }
        };

        // Volume
        let current_volume = volumes.last().copied().unwrap_or(0.0);
        let average_volume: Metric<f64> = if volumes.len() >= cfg.volume_average_window {
            analysis_core::stats::mean(&volumes[volumes.len() - cfg.volume_average_window..]).into()
        } else {
            Metric::Unavailable
        };
        let volume_ratio: Metric<f64> = volume_ratio(&volumes, cfg.volume_average_window).into();
        let volume_level = volume_ratio.map(|r| {
            if r >= cfg.volume_elevated_pct {
                VolumeLevel::Elevated
            } else if r <= cfg.volume_depressed_pct {
                VolumeLevel::Depressed
            } else {
                VolumeLevel::Normal
            }
        });

        let obv_values = obv(bars);
        let obv_last = if obv_values.len() >= 2 { last(&obv_values) } else { Metric::Unavailable };

        let price_changes = cfg
            .price_change_periods
            .iter()
            .map(|&period| PriceChange {
                period,
                change_pct: price_change(&closes, period).into(),
            })
            .collect();

        IndicatorSet {
            current_price: price,
            rsi: rsi_last,
            rsi_zone,
            rsi_trend,
            sma_short,
            sma_medium,
            sma_long,
            trend_alignment,
            ema_fast,
            ema_slow,
            macd: last(&macd_result.macd_line),
            macd_signal: last(&macd_result.signal_line),
            macd_histogram: last(&macd_result.histogram),
            macd_crossover,
            bollinger_upper,
            bollinger_middle,
            bollinger_lower,
            bollinger_percent_b,
            bollinger_bandwidth,
            stochastic_k,
            stochastic_d,
            atr: atr_value,
            volatility,
            current_volume,
            average_volume,
            volume_ratio,
            volume_level,
            obv: obv_last,
            momentum: last(&momentum(&closes, cfg.momentum_period)),
            price_changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::new(start + chrono::Days::new(i as u64), c, c + 1.0, (c - 1.0).max(0.0), c, 1_000 + i as u64)
            })
            .collect();
        PriceSeries::normalize(bars).unwrap()
    }

    #[test]
    fn test_full_history_populates_everything() {
        let closes: Vec<f64> = (0..260).map(|i| 50.0 + i as f64 * 0.5 + (i as f64 / 5.0).sin()).collect();
        let set = IndicatorEngine::default().compute(&series_from_closes(&closes));

        assert!(set.unavailable().is_empty(), "missing: {:?}", set.unavailable());
        assert_eq!(set.trend_alignment, Metric::Available(TrendAlignment::Uptrend));
        assert!(set.rsi_trend.is_available());
        assert!(set.obv.is_available());
        assert_eq!(set.price_changes.len(), 3);
        assert!(set.price_change(60).is_available());
    }

    #[test]
    fn test_single_bar_keeps_price_only() {
        let set = IndicatorEngine::default().compute(&series_from_closes(&[42.0]));

        assert_relative_eq!(set.current_price, 42.0);
        assert!(set.rsi.is_unavailable());
        assert!(set.volatility.is_unavailable());
        assert!(set.obv.is_unavailable());
        assert!(set.sma_short.price_vs_pct.is_unavailable());
        assert!(set.price_change(5).is_unavailable());
    }

    #[test]
    fn test_constant_close() {
        let set = IndicatorEngine::default().compute(&series_from_closes(&[50.0; 40]));

        assert_eq!(set.rsi, Metric::Available(100.0));
        assert_eq!(set.rsi_zone, Metric::Available(RsiZone::Overbought));
        assert!(set.bollinger_upper.is_available());
        assert!(set.bollinger_percent_b.is_unavailable());
        assert_eq!(set.sma_short.value, Metric::Available(50.0));
        assert_eq!(set.sma_short.price_vs_pct, Metric::Available(0.0));
        assert_eq!(set.trend_alignment, Metric::Unavailable);
        assert_eq!(set.volatility, Metric::Available(0.0));
    }

    #[test]
    fn test_minimum_windows() {
        let closes: Vec<f64> = (0..33).map(|i| 100.0 + (i as f64).sin()).collect();
        let set = IndicatorEngine::default().compute(&series_from_closes(&closes));
        assert!(set.macd.is_available());
        assert!(set.macd_signal.is_unavailable());

        let closes: Vec<f64> = (0..34).map(|i| 100.0 + (i as f64).sin()).collect();
        let set = IndicatorEngine::default().compute(&series_from_closes(&closes));
        assert!(set.macd_histogram.is_available());
        // A crossover compares two histogram points
        assert!(set.macd_crossover.is_unavailable());
        // 30 returns need 31 bars
        assert!(set.volatility.is_available());
    }

    #[test]
    fn test_downtrend_alignment() {
        let closes: Vec<f64> = (0..220).map(|i| 500.0 - i as f64).collect();
        let set = IndicatorEngine::default().compute(&series_from_closes(&closes));

        assert_eq!(set.trend_alignment, Metric::Available(TrendAlignment::Downtrend));
        assert!(set.sma_long.price_vs_pct.get().unwrap() < 0.0);
        assert_eq!(set.rsi_zone, Metric::Available(RsiZone::Oversold));
    }

    #[test]
    fn test_volume_level_thresholds() {
        let config = IndicatorConfig::default();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut bars: Vec<PriceBar> = (0..20)
            .map(|i| PriceBar::new(start + chrono::Days::new(i), 10.0, 11.0, 9.0, 10.0, 1_000))
            .collect();
        bars[19].volume = 5_000;
        let set = IndicatorEngine::new(config).compute(&PriceSeries::normalize(bars).unwrap());

        assert_eq!(set.volume_level, Metric::Available(VolumeLevel::Elevated));
        assert_relative_eq!(set.average_volume.get().unwrap(), 1_200.0);
    }

    #[test]
    fn test_non_round_flat_series() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars = (0..60)
            .map(|i| PriceBar::new(start + chrono::Days::new(i), 17.3, 17.3, 17.3, 17.3, 1_000))
            .collect();
        let set = IndicatorEngine::default().compute(&PriceSeries::normalize(bars).unwrap());

        assert_eq!(set.sma_short.value, Metric::Available(17.3));
        assert_eq!(set.sma_medium.value, Metric::Available(17.3));
        assert_eq!(set.sma_short.price_vs_pct, Metric::Available(0.0));
        assert_eq!(set.bollinger_middle, Metric::Available(17.3));
        assert!(set.bollinger_percent_b.is_unavailable());
    }

    #[test]
    fn test_volatility_unavailable_without_positive_year() {
        let mut config = IndicatorConfig::default();
        config.trading_days_per_year = -252.0;
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64).sin()).collect();
        let set = IndicatorEngine::new(config).compute(&series_from_closes(&closes));

        assert!(set.volatility.is_unavailable());
        assert!(set.unavailable().contains(&"volatility"));
    }
}
