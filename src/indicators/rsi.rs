// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Seed average gain / average loss with the SMA of the first `period`
//          deltas (a delta of exactly zero counts as a gain of zero).
// Step 2 — Apply Wilder's exponential smoothing over the remaining deltas:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When the average loss is exactly zero the RSI is 100 — including the flat
// series where both averages are zero. The dashboard front end depends on
// that exact convention.
// =============================================================================

/// Compute the RSI over the full `closes` series with Wilder smoothing.
///
/// # Edge cases
/// - `period == 0` => `None`
/// - `closes.len() < period + 1` => `None` (need at least `period` deltas);
///   the dashboard substitutes the legacy `0` sentinel at the wire edge.
/// - Average loss of zero => exactly `100.0`, never a division error.
/// - A non-finite result => `None`.
pub fn latest_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages over the first `period` deltas ------------------------
    let (sum_gain, sum_loss) = deltas[..period]
        .iter()
        .fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d >= 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    // --- Wilder's smoothing for the remaining deltas -------------------------
    for &delta in &deltas[period..] {
        avg_gain = (avg_gain * (period_f - 1.0) + delta.max(0.0)) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + (-delta).max(0.0)) / period_f;
    }

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    };

    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(latest_rsi(&[], 14).is_none());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(latest_rsi(&[1.0, 2.0, 3.0], 0).is_none());
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need period+1 closes (period deltas). 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(latest_rsi(&closes, 14).is_none());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let rsi = latest_rsi(&closes, 14).unwrap();
        assert!((rsi - 100.0).abs() < 1e-10, "expected 100.0, got {rsi}");
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let rsi = latest_rsi(&closes, 14).unwrap();
        assert!(rsi.abs() < 1e-10, "expected 0.0, got {rsi}");
    }

    #[test]
    fn rsi_flat_market_is_100() {
        // Zero average loss clamps to 100 even with zero gains — the legacy
        // no-division-by-zero convention.
        let closes = vec![100.0; 30];
        let rsi = latest_rsi(&closes, 14).unwrap();
        assert!((rsi - 100.0).abs() < 1e-10, "expected 100.0, got {rsi}");
    }

    #[test]
    fn rsi_range_check() {
        // Arbitrary data — RSI must always be in [0, 100].
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let rsi = latest_rsi(&closes, 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi), "RSI {rsi} out of range");
    }

    #[test]
    fn rsi_wilder_reference_value() {
        // Hand-checked against a step-by-step Wilder calculation: 16 closes,
        // period 3. Deltas: +1, -2, +3, +1, -1, +2, -2, +1, +1, -3, +2, +1,
        // -1, +2, -2.
        let closes = vec![
            10.0, 11.0, 9.0, 12.0, 13.0, 12.0, 14.0, 12.0, 13.0, 14.0, 11.0,
            13.0, 14.0, 13.0, 15.0, 13.0,
        ];
        let rsi = latest_rsi(&closes, 3).unwrap();

        // Replicate the recurrence directly.
        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let mut ag = deltas[..3].iter().filter(|d| **d >= 0.0).sum::<f64>() / 3.0;
        let mut al = -deltas[..3].iter().filter(|d| **d < 0.0).sum::<f64>() / 3.0;
        for &d in &deltas[3..] {
            ag = (ag * 2.0 + d.max(0.0)) / 3.0;
            al = (al * 2.0 + (-d).max(0.0)) / 3.0;
        }
        let expected = 100.0 - 100.0 / (1.0 + ag / al);
        assert!((rsi - expected).abs() < 1e-10);
    }
}
