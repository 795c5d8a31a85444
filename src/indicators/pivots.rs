// =============================================================================
// Floor-Trader Pivot Points
// =============================================================================
//
// Classical pivot levels from the prior session's high, low, and close:
//
//   P  = (H + L + C) / 3
//   R1 = 2P - L        S1 = 2P - H
//   R2 = P + (H - L)   S2 = P - (H - L)

/// The pivot and two support/resistance levels either side of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

/// Compute classical floor-trader pivots from the prior session's bar.
///
/// Returns `None` on a degenerate bar (non-finite inputs or `high < low`).
pub fn floor_pivots(high: f64, low: f64, close: f64) -> Option<PivotLevels> {
    if !high.is_finite() || !low.is_finite() || !close.is_finite() || high < low {
        return None;
    }

    let pivot = (high + low + close) / 3.0;
    let range = high - low;

    Some(PivotLevels {
        pivot,
        r1: 2.0 * pivot - low,
        r2: pivot + range,
        s1: 2.0 * pivot - high,
        s2: pivot - range,
    })
}
