use analysis_core::{stats, PriceBar};

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    data.windows(period).map(window_mean).collect()
}

fn is_flat(window: &[f64]) -> bool {
    window.iter().all(|&v| v == window[0])
}

// A flat window averages to its value exactly; summing would drift by a few ulps.
fn window_mean(window: &[f64]) -> f64 {
    if is_flat(window) {
        return window[0];
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Exponential Moving Average, seeded with the SMA of the first `period` values.
///
/// Element 0 of the output corresponds to input index `period - 1`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len() - period + 1);

    let seed = window_mean(&data[..period]);
    result.push(seed);

    for value in &data[period..] {
        let prev = result[result.len() - 1];
        result.push((value - prev) * multiplier + prev);
    }

    result
}

/// Relative Strength Index with Wilder smoothing.
///
/// The first value uses the simple mean of the first `period` gains and losses and
/// corresponds to input index `period`. A zero average loss gives 100.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for w in data.windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut rsi_values = Vec::with_capacity(data.len() - period);
    rsi_values.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        rsi_values.push(rsi_from_averages(avg_gain, avg_loss));
    }

    rsi_values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// MACD (Moving Average Convergence Divergence)
///
/// `macd_line[0]` corresponds to input index `slow_period - 1`; `signal_line` and
/// `histogram` start `signal_period - 1` MACD values later.
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    if fast_period == 0 || signal_period == 0 || slow_period <= fast_period {
        return MacdResult { macd_line: vec![], signal_line: vec![], histogram: vec![] };
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let offset = slow_period - fast_period;
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, slow)| ema_fast[i + offset] - slow)
        .collect();

    let signal_line = ema(&macd_line, signal_period);

    let hist_offset = signal_period - 1;
    let histogram = signal_line
        .iter()
        .enumerate()
        .map(|(i, signal)| macd_line[i + hist_offset] - signal)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands over a population standard deviation.
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    if period == 0 || data.len() < period {
        return BollingerBands { upper: vec![], middle: vec![], lower: vec![] };
    }

    let middle = sma(data, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (i, mean) in middle.iter().enumerate() {
        let window = &data[i..i + period];
        let std = if is_flat(window) {
            0.0
        } else {
            stats::population_std_dev(window).unwrap_or(0.0)
        };
        upper.push(mean + std_dev * std);
        lower.push(mean - std_dev * std);
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Position of `price` within the bands, 0 at the lower band and 100 at the upper.
/// `None` for a band whose width is zero or within rounding of zero.
pub fn percent_b(price: f64, upper: f64, lower: f64) -> Option<f64> {
    let width = upper - lower;
    if width <= f64::EPSILON * (upper.abs() + lower.abs()) {
        return None;
    }
    Some((price - lower) / width * 100.0)
}

/// Band width relative to the middle band, in percent.
pub fn bandwidth(upper: f64, middle: f64, lower: f64) -> Option<f64> {
    if middle <= 0.0 {
        return None;
    }
    Some((upper - lower) / middle * 100.0)
}

/// Average True Range with Wilder smoothing. First value corresponds to bar `period`.
pub fn atr(bars: &[PriceBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return vec![];
    }

    let true_ranges: Vec<f64> = bars
        .windows(2)
        .map(|w| {
            let high_low = w[1].high - w[1].low;
            let high_close = (w[1].high - w[0].close).abs();
            let low_close = (w[1].low - w[0].close).abs();
            high_low.max(high_close).max(low_close)
        })
        .collect();

    let mut atr_values = Vec::with_capacity(true_ranges.len() - period + 1);
    let mut atr = true_ranges[..period].iter().sum::<f64>() / period as f64;
    atr_values.push(atr);

    for tr in &true_ranges[period..] {
        atr = (atr * (period - 1) as f64 + tr) / period as f64;
        atr_values.push(atr);
    }

    atr_values
}

/// Stochastic Oscillator
///
/// A %K point over a window with no high/low range is `None`; a %D point is `None`
/// unless all of its %K inputs are defined.
pub struct StochasticResult {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

pub fn stochastic(bars: &[PriceBar], k_period: usize, d_period: usize) -> StochasticResult {
    if k_period == 0 || d_period == 0 || bars.len() < k_period {
        return StochasticResult { k: vec![], d: vec![] };
    }

    let k_values: Vec<Option<f64>> = bars
        .windows(k_period)
        .map(|window| {
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let close = window[window.len() - 1].close;

            if highest > lowest {
                Some(100.0 * (close - lowest) / (highest - lowest))
            } else {
                None
            }
        })
        .collect();

    let d_values = k_values
        .windows(d_period)
        .map(|window| {
            let defined: Option<Vec<f64>> = window.iter().copied().collect();
            defined.map(|v| v.iter().sum::<f64>() / d_period as f64)
        })
        .collect();

    StochasticResult {
        k: k_values,
        d: d_values,
    }
}

/// On-Balance Volume, starting from zero at the first bar.
pub fn obv(bars: &[PriceBar]) -> Vec<f64> {
    if bars.is_empty() {
        return vec![];
    }

    let mut obv_values = Vec::with_capacity(bars.len());
    obv_values.push(0.0);

    for w in bars.windows(2) {
        let prev_obv = obv_values[obv_values.len() - 1];
        let volume = w[1].volume as f64;
        let new_obv = if w[1].close > w[0].close {
            prev_obv + volume
        } else if w[1].close < w[0].close {
            prev_obv - volume
        } else {
            prev_obv
        };
        obv_values.push(new_obv);
    }

    obv_values
}

/// Price difference over `period` bars: `c[t] - c[t - period]`.
pub fn momentum(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return vec![];
    }
    data.iter().skip(period).zip(data).map(|(now, then)| now - then).collect()
}

/// Percent change of the last value over `period` bars. `None` when the series is
/// too short or the base close is zero.
pub fn price_change(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() <= period {
        return None;
    }
    let last = data[data.len() - 1];
    let base = data[data.len() - 1 - period];
    stats::pct_change(base, last)
}

/// Annualized volatility from the last `window` simple returns (sample stdev).
pub fn annualized_volatility(returns: &[f64], window: usize, periods_per_year: f64) -> Option<f64> {
    if window < 2 || returns.len() < window {
        return None;
    }
    let recent = &returns[returns.len() - window..];
    stats::sample_std_dev(recent).map(|sd| sd * periods_per_year.sqrt())
}

/// Latest volume as a percentage of the mean over the last `window` volumes
/// (current bar included).
pub fn volume_ratio(volumes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || volumes.len() < window {
        return None;
    }
    let recent = &volumes[volumes.len() - window..];
    let average = stats::mean(recent)?;
    if average <= 0.0 {
        return None;
    }
    Some(volumes[volumes.len() - 1] / average * 100.0)
}
