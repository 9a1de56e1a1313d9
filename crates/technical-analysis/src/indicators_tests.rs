#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use analysis_core::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    // Wilder's reference closes
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn make_bars(ohlc: &[(f64, f64, f64, f64)]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ohlc.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| {
                PriceBar::new(start + chrono::Days::new(i as u64), open, high, low, close, 1_000_000)
            })
            .collect()
    }

    // Steady uptrend: open 100+i, high 102+i, low 99+i, close 101+i
    fn sample_bars() -> Vec<PriceBar> {
        let ohlc: Vec<_> = (0..15)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base, base + 2.0, base - 1.0, base + 1.0)
            })
            .collect();
        make_bars(&ohlc)
    }

    fn wave(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + 10.0 * (i as f64 / 8.0).sin()).collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001);
        assert!((result[1] - 3.0).abs() < 0.001);
        assert!((result[2] - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert!(sma(&data, 5).is_empty());
        assert!(sma(&data, 0).is_empty());
    }

    #[test]
    fn test_sma_of_identical_values_is_exact() {
        for n in [20, 50, 200] {
            let data = vec![123.45; n];
            let result = sma(&data, n);
            assert_eq!(result.len(), 1);
            assert_eq!(result[0], 123.45);
        }
    }

    #[test]
    fn test_flat_windows_average_exactly() {
        for value in [17.3, 0.1, 123.45] {
            let data = vec![value; 60];
            assert!(sma(&data, 20).iter().all(|&v| v == value));
            assert!(sma(&data, 50).iter().all(|&v| v == value));
            assert!(ema(&data, 12).iter().all(|&v| v == value));
        }
    }

    #[test]
    fn test_ema_seed_and_alignment() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let result = ema(&data, 3);

        // Seed is SMA(1,2,3) and lines up with input index 2
        assert_eq!(result.len(), 4);
        assert_relative_eq!(result[0], 2.0);
        assert_relative_eq!(result[1], 3.0);
        assert_relative_eq!(result[3], 5.0);
    }

    #[test]
    fn test_ema_too_short() {
        assert!(ema(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn test_rsi_reference_values() {
        let result = rsi(&sample_prices(), 14);

        // First value needs 15 closes
        assert_eq!(result.len(), 6);
        assert!((result[0] - 70.464).abs() < 0.01);
        assert!((result[1] - 66.250).abs() < 0.01);
        assert!((result[5] - 57.915).abs() < 0.01);
    }

    #[test]
    fn test_rsi_bounds() {
        for value in rsi(&wave(120), 14) {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_constant_close_is_100() {
        let result = rsi(&vec![50.0; 30], 14);
        assert!(!result.is_empty());
        assert!(result.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rsi(&sample_prices()[..14], 14).is_empty());
    }

    #[test]
    fn test_macd_minimum_windows() {
        let closes = wave(26);
        let result = macd(&closes, 12, 26, 9);
        assert_eq!(result.macd_line.len(), 1);
        assert!(result.signal_line.is_empty());

        let closes = wave(34);
        let result = macd(&closes, 12, 26, 9);
        assert_eq!(result.macd_line.len(), 9);
        assert_eq!(result.signal_line.len(), 1);
        assert_eq!(result.histogram.len(), 1);
    }

    #[test]
    fn test_macd_histogram_crossing_matches_lines() {
        let closes = wave(80);
        let result = macd(&closes, 12, 26, 9);
        let hist = &result.histogram;

        let crossing = (1..hist.len())
            .find(|&i| hist[i - 1] <= 0.0 && hist[i] > 0.0)
            .expect("wave should produce a bullish crossing");

        for i in [crossing - 1, crossing] {
            let diff = result.macd_line[i + 8] - result.signal_line[i];
            assert_relative_eq!(hist[i], diff, epsilon = 1e-12);
        }
        assert!(result.macd_line[crossing + 7] <= result.signal_line[crossing - 1]);
        assert!(result.macd_line[crossing + 8] > result.signal_line[crossing]);
    }

    #[test]
    fn test_macd_invalid_periods() {
        let result = macd(&wave(60), 26, 12, 9);
        assert!(result.macd_line.is_empty());
    }

    #[test]
    fn test_bollinger_bands_population_std() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bb = bollinger_bands(&data, 8, 2.0);

        assert_eq!(bb.middle.len(), 1);
        assert_relative_eq!(bb.middle[0], 5.0);
        assert_relative_eq!(bb.upper[0], 9.0, epsilon = 1e-12);
        assert_relative_eq!(bb.lower[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bollinger_constant_close_collapses() {
        let data = vec![50.0; 20];
        let bb = bollinger_bands(&data, 20, 2.0);

        assert_eq!(bb.upper[0], bb.lower[0]);
        assert!(percent_b(50.0, bb.upper[0], bb.lower[0]).is_none());
        assert_relative_eq!(bandwidth(bb.upper[0], bb.middle[0], bb.lower[0]).unwrap(), 0.0);
    }

    #[test]
    fn test_bollinger_non_round_constant_is_flat() {
        for value in [17.3, 0.1, 123.45] {
            let bb = bollinger_bands(&vec![value; 20], 20, 2.0);

            assert_eq!(bb.middle[0], value);
            assert_eq!(bb.upper[0], value);
            assert_eq!(bb.lower[0], value);
            assert!(percent_b(value, bb.upper[0], bb.lower[0]).is_none());
        }
    }

    #[test]
    fn test_percent_b_rounding_width_is_flat() {
        let upper = 17.300000000000004;
        let lower = 17.3;
        assert!(percent_b(17.3, upper, lower).is_none());
    }

    #[test]
    fn test_percent_b() {
        assert_relative_eq!(percent_b(15.0, 20.0, 10.0).unwrap(), 50.0);
        assert_relative_eq!(percent_b(22.0, 20.0, 10.0).unwrap(), 120.0);
    }

    #[test]
    fn test_atr_constant_range() {
        let bars = sample_bars();
        let result = atr(&bars, 14);

        // Every true range is high - low = 3
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_atr_insufficient_data() {
        let bars = sample_bars();
        assert!(atr(&bars[..14], 14).is_empty());
    }

    #[test]
    fn test_stochastic_uptrend() {
        let bars = sample_bars();
        let result = stochastic(&bars, 14, 3);

        assert_eq!(result.k.len(), 2);
        // Window 0..14: low 99, high 115, close 114
        assert_relative_eq!(result.k[0].unwrap(), 93.75, epsilon = 1e-12);
        assert!(result.d.is_empty());
    }

    #[test]
    fn test_stochastic_flat_window_is_undefined() {
        let flat = make_bars(&[(10.0, 10.0, 10.0, 10.0); 16]);
        let result = stochastic(&flat, 14, 3);

        assert!(result.k.iter().all(|k| k.is_none()));
        assert_eq!(result.d.len(), 1);
        assert!(result.d[0].is_none());
    }

    #[test]
    fn test_stochastic_d_is_mean_of_k() {
        let mut ohlc: Vec<_> = (0..16)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base, base + 2.0, base - 1.0, base + 1.0)
            })
            .collect();
        ohlc[15] = (110.0, 116.0, 108.0, 109.0);
        let bars = make_bars(&ohlc);
        let result = stochastic(&bars, 14, 3);

        let expected = result.k.iter().map(|k| k.unwrap()).sum::<f64>() / 3.0;
        assert_relative_eq!(result.d[0].unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_obv() {
        let bars = make_bars(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 12.0, 9.0, 10.0),
            (10.0, 11.0, 9.0, 10.0),
        ]);
        let result = obv(&bars);

        assert_eq!(result, vec![0.0, 1_000_000.0, 0.0, 0.0]);
    }

    #[test]
    fn test_momentum_and_price_change() {
        let data: Vec<f64> = (0..11).map(|i| 100.0 + i as f64).collect();

        let m = momentum(&data, 10);
        assert_eq!(m.len(), 1);
        assert_relative_eq!(m[0], 10.0);

        assert_relative_eq!(price_change(&data, 10).unwrap(), 10.0, epsilon = 1e-12);
        assert!(price_change(&data, 11).is_none());
        assert!(price_change(&[0.0, 5.0], 1).is_none());
    }

    #[test]
    fn test_annualized_volatility() {
        let returns: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 0.01 } else { -0.01 }).collect();
        let vol = annualized_volatility(&returns, 30, 252.0).unwrap();

        let expected = 0.01 * (30.0_f64 / 29.0).sqrt() * 252.0_f64.sqrt();
        assert_relative_eq!(vol, expected, epsilon = 1e-12);
        assert!(annualized_volatility(&returns[..29], 30, 252.0).is_none());
    }

    #[test]
    fn test_volume_ratio() {
        let mut volumes = vec![1000.0; 19];
        volumes.push(3000.0);
        // Mean includes the current bar: 22000 / 20 = 1100
        assert_relative_eq!(volume_ratio(&volumes, 20).unwrap(), 3000.0 / 1100.0 * 100.0, epsilon = 1e-9);

        assert!(volume_ratio(&[0.0; 20], 20).is_none());
        assert!(volume_ratio(&volumes[..10], 20).is_none());
    }
}
