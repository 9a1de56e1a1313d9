//! Engine configuration.
//!
//! Every window size, band and weight the engine uses lives here. `Default` holds the
//! documented constants; callers may override any of them (e.g. from a JSON file) and
//! pass the result into the orchestrator at construction time.

use serde::{Deserialize, Serialize};

use crate::AnalysisError;

// Indicator windows
pub const RSI_PERIOD: usize = 14;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_TREND_LOOKBACK: usize = 5;
pub const SMA_SHORT: usize = 20;
pub const SMA_MEDIUM: usize = 50;
pub const SMA_LONG: usize = 200;
pub const EMA_FAST: usize = 12;
pub const EMA_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_DEV: f64 = 2.0;
pub const STOCHASTIC_K: usize = 14;
pub const STOCHASTIC_D: usize = 3;
pub const ATR_PERIOD: usize = 14;
pub const VOLATILITY_WINDOW: usize = 30;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const VOLUME_AVERAGE_WINDOW: usize = 20;
pub const VOLUME_ELEVATED_PCT: f64 = 120.0;
pub const VOLUME_DEPRESSED_PCT: f64 = 80.0;
pub const MOMENTUM_PERIOD: usize = 10;
pub const PRICE_CHANGE_PERIODS: [usize; 3] = [5, 20, 60];

// Composite weights (sum to 1.0)
pub const TECHNICAL_WEIGHT: f64 = 0.25;
pub const FUNDAMENTAL_WEIGHT: f64 = 0.25;
pub const MOMENTUM_WEIGHT: f64 = 0.15;
pub const VALUE_WEIGHT: f64 = 0.20;
pub const GROWTH_WEIGHT: f64 = 0.15;

// DCF assumptions
pub const DCF_DEFAULT_GROWTH: f64 = 0.05;
pub const DCF_MIN_GROWTH: f64 = 0.02;
pub const DCF_MAX_GROWTH: f64 = 0.15;
pub const DCF_RISK_FREE_RATE: f64 = 0.03;
pub const DCF_EQUITY_RISK_PREMIUM: f64 = 0.07;
pub const DCF_DEFAULT_BETA: f64 = 1.0;
pub const DCF_TERMINAL_GROWTH: f64 = 0.025;
pub const DCF_PROJECTION_YEARS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// RSI values compared when classifying the RSI trend direction
    pub rsi_trend_lookback: usize,
    pub sma_short: usize,
    pub sma_medium: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub atr_period: usize,
    pub volatility_window: usize,
    pub trading_days_per_year: f64,
    pub volume_average_window: usize,
    pub volume_elevated_pct: f64,
    pub volume_depressed_pct: f64,
    pub momentum_period: usize,
    pub price_change_periods: Vec<usize>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: RSI_PERIOD,
            rsi_overbought: RSI_OVERBOUGHT,
            rsi_oversold: RSI_OVERSOLD,
            rsi_trend_lookback: RSI_TREND_LOOKBACK,
            sma_short: SMA_SHORT,
            sma_medium: SMA_MEDIUM,
            sma_long: SMA_LONG,
            ema_fast: EMA_FAST,
            ema_slow: EMA_SLOW,
            macd_signal: MACD_SIGNAL,
            bollinger_period: BOLLINGER_PERIOD,
            bollinger_std_dev: BOLLINGER_STD_DEV,
            stochastic_k: STOCHASTIC_K,
            stochastic_d: STOCHASTIC_D,
            atr_period: ATR_PERIOD,
            volatility_window: VOLATILITY_WINDOW,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            volume_average_window: VOLUME_AVERAGE_WINDOW,
            volume_elevated_pct: VOLUME_ELEVATED_PCT,
            volume_depressed_pct: VOLUME_DEPRESSED_PCT,
            momentum_period: MOMENTUM_PERIOD,
            price_change_periods: PRICE_CHANGE_PERIODS.to_vec(),
        }
    }
}

/// Assumptions used to resolve DCF inputs from a fundamentals snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfConfig {
    /// Used for revenue/earnings growth when the snapshot lacks them
    pub default_growth: f64,
    pub min_growth: f64,
    pub max_growth: f64,
    pub risk_free_rate: f64,
    pub equity_risk_premium: f64,
    pub default_beta: f64,
    pub terminal_growth_rate: f64,
    pub projection_years: u32,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            default_growth: DCF_DEFAULT_GROWTH,
            min_growth: DCF_MIN_GROWTH,
            max_growth: DCF_MAX_GROWTH,
            risk_free_rate: DCF_RISK_FREE_RATE,
            equity_risk_premium: DCF_EQUITY_RISK_PREMIUM,
            default_beta: DCF_DEFAULT_BETA,
            terminal_growth_rate: DCF_TERMINAL_GROWTH,
            projection_years: DCF_PROJECTION_YEARS,
        }
    }
}

/// Fair range for one valuation multiple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBand {
    pub low: f64,
    pub high: f64,
    pub market_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationBands {
    pub price_to_earnings: RatioBand,
    pub price_to_book: RatioBand,
    pub price_to_sales: RatioBand,
}

impl Default for ValuationBands {
    fn default() -> Self {
        Self {
            price_to_earnings: RatioBand { low: 15.0, high: 30.0, market_average: 22.5 },
            price_to_book: RatioBand { low: 1.5, high: 5.0, market_average: 3.5 },
            price_to_sales: RatioBand { low: 1.0, high: 4.0, market_average: 2.5 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub momentum: f64,
    pub value: f64,
    pub growth: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            technical: TECHNICAL_WEIGHT,
            fundamental: FUNDAMENTAL_WEIGHT,
            momentum: MOMENTUM_WEIGHT,
            value: VALUE_WEIGHT,
            growth: GROWTH_WEIGHT,
        }
    }
}

impl ScoreWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [self.technical, self.fundamental, self.momentum, self.value, self.growth]
    }
}

/// Lower bounds (inclusive) of each recommendation band on the 0-100 composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub strong_buy: f64,
    pub buy: f64,
    pub hold: f64,
    pub sell: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 80.0,
            buy: 65.0,
            hold: 45.0,
            sell: 30.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorConfig,
    pub dcf: DcfConfig,
    pub bands: ValuationBands,
    pub weights: ScoreWeights,
    pub thresholds: RecommendationThresholds,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::Config(format!("Failed to parse engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let ind = &self.indicators;
        let periods = [
            ("rsi_period", ind.rsi_period),
            ("sma_short", ind.sma_short),
            ("sma_medium", ind.sma_medium),
            ("sma_long", ind.sma_long),
            ("ema_fast", ind.ema_fast),
            ("ema_slow", ind.ema_slow),
            ("macd_signal", ind.macd_signal),
            ("bollinger_period", ind.bollinger_period),
            ("stochastic_k", ind.stochastic_k),
            ("stochastic_d", ind.stochastic_d),
            ("atr_period", ind.atr_period),
            ("volatility_window", ind.volatility_window),
            ("volume_average_window", ind.volume_average_window),
            ("momentum_period", ind.momentum_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(AnalysisError::Config(format!("{} must be greater than zero", name)));
        }
        if ind.price_change_periods.iter().any(|&p| p == 0) {
            return Err(AnalysisError::Config("price_change_periods must be non-zero".to_string()));
        }
        for (name, value) in [
            ("bollinger_std_dev", ind.bollinger_std_dev),
            ("trading_days_per_year", ind.trading_days_per_year),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::Config(format!("{} must be positive", name)));
            }
        }
        if ind.ema_fast >= ind.ema_slow {
            return Err(AnalysisError::Config("ema_fast must be shorter than ema_slow".to_string()));
        }

        let weights = self.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::Config("score weights must be non-negative".to_string()));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(AnalysisError::Config("score weights must not all be zero".to_string()));
        }

        let t = &self.thresholds;
        if !(t.strong_buy >= t.buy && t.buy >= t.hold && t.hold >= t.sell) {
            return Err(AnalysisError::Config(
                "recommendation thresholds must be descending".to_string(),
            ));
        }

        for (name, band) in [
            ("price_to_earnings", &self.bands.price_to_earnings),
            ("price_to_book", &self.bands.price_to_book),
            ("price_to_sales", &self.bands.price_to_sales),
        ] {
            if band.low > band.high || band.market_average <= 0.0 {
                return Err(AnalysisError::Config(format!("invalid {} band", name)));
            }
        }

        if self.dcf.min_growth > self.dcf.max_growth {
            return Err(AnalysisError::Config("dcf.min_growth exceeds dcf.max_growth".to_string()));
        }

        Ok(())
    }
}
