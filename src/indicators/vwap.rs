// =============================================================================
// Session VWAP — Volume-Weighted Average Price since a session boundary
// =============================================================================
//
// VWAP = Σ(typical_price * volume) / Σ(volume) over the session's bars, where
// typical price is HLC/3. The band is one volume-weighted standard deviation
// of the typical price around the VWAP:
//
//   σ_vwap = sqrt( Σ(volume * (tp - VWAP)²) / Σ(volume) )

use crate::types::Candle;

/// Session VWAP with a ±1σ band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VwapBands {
    pub vwap: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Compute the session VWAP over every candle whose open time is at or after
/// `session_start_ms`.
///
/// Returns `None` when no candle falls inside the session or the session's
/// total volume is zero.
pub fn session_vwap(candles: &[Candle], session_start_ms: i64) -> Option<VwapBands> {
    let session: Vec<&Candle> = candles
        .iter()
        .filter(|c| c.open_time >= session_start_ms)
        .collect();

    let total_volume: f64 = session.iter().map(|c| c.volume).sum();
    if session.is_empty() || total_volume == 0.0 {
        return None;
    }

    let vwap = session
        .iter()
        .map(|c| c.typical_price() * c.volume)
        .sum::<f64>()
        / total_volume;

    let variance = session
        .iter()
        .map(|c| c.volume * (c.typical_price() - vwap).powi(2))
        .sum::<f64>()
        / total_volume;
    let std_dev = variance.sqrt();

    if !vwap.is_finite() || !std_dev.is_finite() {
        return None;
    }

    Some(VwapBands {
        vwap,
        upper: vwap + std_dev,
        lower: vwap - std_dev,
    })
}
