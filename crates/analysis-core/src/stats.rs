//! Small descriptive-statistics helpers shared by the indicator, performance and
//! scoring crates. Empty or too-short inputs yield `None` instead of NaN.

use statrs::statistics::Statistics;

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.mean())
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    Some(data.std_dev())
}

/// Population standard deviation (n denominator).
pub fn population_std_dev(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.population_std_dev())
}

/// Median; the mean of the two middle values for even lengths.
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentage change from `from` to `to`; `None` when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to / from - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_median() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_relative_eq!(mean(&data).unwrap(), 2.8);
        assert_relative_eq!(median(&data).unwrap(), 3.0);
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_std_dev_flavours() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_std_dev(&data).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(sample_std_dev(&data).unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert!(sample_std_dev(&[1.0]).is_none());
    }

    #[test]
    fn test_pct_change() {
        assert_relative_eq!(pct_change(100.0, 120.0).unwrap(), 20.0, epsilon = 1e-12);
        assert!(pct_change(0.0, 5.0).is_none());
    }
}
