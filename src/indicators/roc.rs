// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.

/// The ROC of the most recent close against the close `period` bars earlier.
///
/// Returns `None` when there is insufficient history (the dashboard
/// substitutes the legacy `0` sentinel) or the reference close is zero.
pub fn latest_roc(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }

    let last = closes[closes.len() - 1];
    let reference = closes[closes.len() - 1 - period];
    if reference == 0.0 {
        return None;
    }

    let roc = ((last - reference) / reference) * 100.0;
    if roc.is_finite() {
        Some(roc)
    } else {
        None
    }
}
