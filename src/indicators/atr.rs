// =============================================================================
// Average True Range (ATR) — SMA of trailing True Ranges
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// The dashboard's ATR is the plain arithmetic mean of the last `period` TR
// values (not Wilder's smoothed variant): the front end was calibrated
// against that definition and the two disagree after the seed.
//
// Default period: 14
// =============================================================================

use crate::types::Candle;

/// Compute the most recent ATR value from a slice of OHLCV candles.
///
/// # Arguments
/// - `candles` — OHLCV candles, oldest first.
/// - `period`  — look-back window for the ATR calculation.
///
/// # Returns
/// `None` when:
/// - `period` is zero.
/// - There are fewer than `period + 1` candles (we need `period` TR values,
///   each requiring a previous candle for the True Range calculation).
/// - Any intermediate value is non-finite.
pub fn latest_atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    // --- True Range for each consecutive pair --------------------------------
    let mut tr_values: Vec<f64> = Vec::with_capacity(candles.len() - 1);
    for i in 1..candles.len() {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_close = candles[i - 1].close;

        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();

        tr_values.push(hl.max(hc).max(lc));
    }

    // --- Mean of the trailing `period` TR values -----------------------------
    let window = &tr_values[tr_values.len() - period..];
    let atr = window.iter().sum::<f64>() / period as f64;

    if atr.is_finite() {
        Some(atr)
    } else {
        None
    }
}

/// ATR as a percentage of `reference_price` (typically the last close).
///
/// Useful for comparing volatility across assets with different price scales.
pub fn latest_atr_pct(candles: &[Candle], period: usize, reference_price: f64) -> Option<f64> {
    let atr = latest_atr(candles, period)?;
    if reference_price == 0.0 {
        return None;
    }
    Some((atr / reference_price) * 100.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Build a test candle with the given OHLC values.
    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(0, open, high, low, close, 100.0, 0)
    }

    #[test]
    fn atr_period_zero() {
        let candles = vec![candle(100.0, 105.0, 95.0, 102.0); 20];
        assert!(latest_atr(&candles, 0).is_none());
    }

    #[test]
    fn atr_insufficient_data() {
        // Need period + 1 = 15 candles for period=14, only have 10.
        let candles = vec![candle(100.0, 105.0, 95.0, 102.0); 10];
        assert!(latest_atr(&candles, 14).is_none());
    }

    #[test]
    fn atr_constant_range() {
        // Identical candles: every TR is H-L = 10, so the mean is exactly 10.
        let candles = vec![candle(100.0, 105.0, 95.0, 100.0); 30];
        let atr = latest_atr(&candles, 14).unwrap();
        assert!((atr - 10.0).abs() < 1e-10, "expected 10.0, got {atr}");
    }

    #[test]
    fn atr_is_plain_mean_of_trailing_window() {
        // period=2 over 4 candles: only the last two TRs count.
        let candles = vec![
            candle(100.0, 102.0, 98.0, 101.0),
            candle(101.0, 103.0, 100.0, 102.0), // TR = max(3, 2, 1) = 3
            candle(102.0, 108.0, 101.0, 107.0), // TR = max(7, 6, 1) = 7
            candle(107.0, 109.0, 105.0, 106.0), // TR = max(4, 2, 2) = 4
        ];
        let atr = latest_atr(&candles, 2).unwrap();
        assert!((atr - (7.0 + 4.0) / 2.0).abs() < 1e-10, "got {atr}");
    }

    #[test]
    fn atr_true_range_uses_prev_close() {
        // Gap scenario: |H - prevClose| > H - L.
        let candles = vec![
            candle(100.0, 105.0, 95.0, 95.0),   // close at low
            candle(110.0, 115.0, 108.0, 112.0), // gap up: |115-95|=20 > 7
            candle(112.0, 118.0, 110.0, 115.0),
            candle(115.0, 120.0, 113.0, 118.0),
        ];
        let atr = latest_atr(&candles, 3).unwrap();
        // TRs: 20, max(8, 6, 5)=8, max(7, 5, 2)=7 — mean ≈ 11.67.
        assert!((atr - 35.0 / 3.0).abs() < 1e-10, "got {atr}");
    }

    #[test]
    fn atr_pct_scales_by_reference() {
        let candles = vec![candle(100.0, 105.0, 95.0, 100.0); 20];
        let pct = latest_atr_pct(&candles, 14, 200.0).unwrap();
        assert!((pct - 5.0).abs() < 1e-10, "10 / 200 * 100 = 5, got {pct}");
    }

    #[test]
    fn atr_pct_zero_reference_is_none() {
        let candles = vec![candle(100.0, 105.0, 95.0, 100.0); 20];
        assert!(latest_atr_pct(&candles, 14, 0.0).is_none());
    }

    #[test]
    fn atr_nan_returns_none() {
        let mut candles = vec![candle(100.0, 105.0, 95.0, 100.0); 4];
        candles[1].high = f64::NAN;
        assert!(latest_atr(&candles, 3).is_none());
    }
}
