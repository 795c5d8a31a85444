// =============================================================================
// Moving-Average Family (SMA / EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
// =============================================================================

/// Arithmetic mean of the last `period` values.
///
/// When fewer than `period` values exist, the mean is taken over ALL available
/// values (dividing by the actual count). The upstream dashboard historically
/// sliced whatever was available here; averaging over the true count is the
/// documented resolution of that behaviour.
///
/// Returns `None` when the input is empty or `period` is zero.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.is_empty() {
        return None;
    }

    let window = &values[values.len().saturating_sub(period)..];
    let mean = window.iter().sum::<f64>() / window.len() as f64;

    if mean.is_finite() {
        Some(mean)
    } else {
        None
    }
}

/// Population standard deviation over the last `period` values.
///
/// Follows the same window rule as [`sma`]: with fewer than `period` values,
/// all available values are used and the divisor is the actual count.
pub fn population_std(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.is_empty() {
        return None;
    }

    let window = &values[values.len().saturating_sub(period)..];
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let variance =
        window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / window.len() as f64;
    let std = variance.sqrt();

    if std.is_finite() {
        Some(std)
    } else {
        None
    }
}

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Element `i` of the result is the EMA over the close prefix of length
/// `period + i` — equivalently, the value an EMA recomputed from scratch over
/// that prefix would produce. The MACD module relies on this equivalence.
///
/// # Edge cases
/// - `period == 0` => empty vec (division by zero guard)
/// - `closes.len() < period` => empty vec
/// - A non-finite intermediate value truncates the series.
pub fn ema_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let seed: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(seed);

    let mut prev_ema = seed;
    for &close in &closes[period..] {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            // Downstream consumers should not trust a broken series.
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    result
}

/// The EMA over the full series — the last element of [`ema_series`].
///
/// Returns `None` when the series is shorter than `period`; the dashboard
/// substitutes the legacy `0` sentinel at the wire edge.
pub fn latest_ema(closes: &[f64], period: usize) -> Option<f64> {
    ema_series(closes, period).last().copied()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert!(sma(&[], 5).is_none());
    }

    #[test]
    fn sma_period_zero() {
        assert!(sma(&[1.0, 2.0], 0).is_none());
    }

    #[test]
    fn sma_uses_trailing_window() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        // Last 2 values: (3 + 4) / 2
        assert!((sma(&values, 2).unwrap() - 3.5).abs() < 1e-10);
    }

    #[test]
    fn sma_short_input_divides_by_actual_count() {
        // Fewer values than the period: mean over what exists, not sum/period.
        let values = vec![2.0, 4.0];
        assert!((sma(&values, 10).unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn population_std_flat_is_zero() {
        let values = vec![5.0; 20];
        assert!(population_std(&values, 20).unwrap().abs() < 1e-12);
    }

    #[test]
    fn population_std_known_value() {
        // Population σ of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&values, 8).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn ema_insufficient_data() {
        assert!(ema_series(&[1.0, 2.0], 5).is_empty());
        assert!(latest_ema(&[1.0, 2.0], 5).is_none());
    }

    #[test]
    fn ema_period_equals_length() {
        let closes = vec![2.0, 4.0, 6.0];
        let ema = ema_series(&closes, 3);
        assert_eq!(ema.len(), 1);
        // Should be the SMA = (2+4+6)/3 = 4.0
        assert!((ema[0] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..10]: SMA of first 5 = 3.0, multiplier = 1/3.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = ema_series(&closes, 5);
        assert_eq!(ema.len(), 6);

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        let mut expected_vec = vec![expected];
        for &c in &closes[5..] {
            expected = c * mult + expected * (1.0 - mult);
            expected_vec.push(expected);
        }
        for (a, b) in ema.iter().zip(expected_vec.iter()) {
            assert!((a - b).abs() < 1e-10, "got {a}, expected {b}");
        }
    }

    #[test]
    fn ema_series_element_matches_prefix_recomputation() {
        // The guarantee the MACD module depends on: series element i equals
        // a from-scratch EMA over the prefix of length period + i.
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let series = ema_series(&closes, 12);
        for (i, &v) in series.iter().enumerate() {
            let prefix = &closes[..12 + i];
            let from_prefix = *ema_series(prefix, 12).last().unwrap();
            assert!((v - from_prefix).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_handles_nan_in_input() {
        let closes = vec![1.0, 2.0, 3.0, f64::NAN, 5.0];
        let ema = ema_series(&closes, 3);
        // Seed is finite, the NaN truncates the rest.
        assert_eq!(ema.len(), 1);
    }
}
