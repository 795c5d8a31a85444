// =============================================================================
// Bollinger Band Width
// =============================================================================
//
// The dashboard reports a single volatility scalar per timeframe: the full
// band width (2 * k * σ over the trailing window) expressed as a percentage
// of a reference price — the last close, not the middle band, matching what
// the front end renders.

use crate::indicators::ema::population_std;

/// Band width as a percentage of `reference_price`.
///
///   width% = (2 * num_std * σ_period) / reference * 100
///
/// Returns `None` when σ cannot be computed or the reference price is zero.
pub fn band_width_pct(
    closes: &[f64],
    period: usize,
    num_std: f64,
    reference_price: f64,
) -> Option<f64> {
    if reference_price == 0.0 {
        return None;
    }

    let std_dev = population_std(closes, period)?;
    let width = (2.0 * num_std * std_dev / reference_price) * 100.0;

    if width.is_finite() {
        Some(width)
    } else {
        None
    }
}
