// =============================================================================
// Block C — Volume delta over trailing wall-clock windows
// =============================================================================
//
// One 1-minute kline fetch (up to 1500 bars ≈ 25 h), bucketed into bull and
// bear volume per trailing window. A bar is bullish when close ≥ open. The
// three shorter windows also get a relative-activity label comparing their
// volume against a proportional share of the 24h baseline.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::binance::BinanceClient;
use crate::dashboard::round_dp;
use crate::error::BlockError;
use crate::types::Candle;

/// Lookback windows: wire label and length in hours.
pub const WINDOWS: [(&str, f64); 4] = [("15m", 0.25), ("1h", 1.0), ("4h", 4.0), ("24h", 24.0)];

/// Labels that also get a relative-activity classification.
const RELATIVE_WINDOWS: [&str; 3] = ["15m", "1h", "4h"];

/// Bull/bear/total volume for one window, 2 dp.
///
/// The reported total is the sum of the two reported (rounded) buckets, so
/// `bullVol + bearVol == totalVol` holds exactly on the wire.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VolumeWindowTotals {
    #[serde(rename = "bullVol")]
    pub bull_vol: f64,
    #[serde(rename = "bearVol")]
    pub bear_vol: f64,
    #[serde(rename = "totalVol")]
    pub total_vol: f64,
}

/// The record served as `dataC`: one entry per window plus the relative map.
#[derive(Debug, Clone, Serialize)]
pub struct VolumeDelta {
    #[serde(flatten)]
    pub windows: BTreeMap<String, VolumeWindowTotals>,
    pub relative: BTreeMap<String, String>,
}

/// Classify a window's volume ratio against its 24h-proportional baseline.
///
/// The comparators are strict: a ratio of exactly 2 is "high", not
/// "very high".
pub fn classify_ratio(ratio: f64) -> &'static str {
    if ratio > 2.0 {
        "very high"
    } else if ratio > 1.2 {
        "high"
    } else if ratio < 0.5 {
        "low"
    } else {
        "normal"
    }
}

/// Bucket candle volume into the trailing windows ending at `now_ms`.
///
/// Pure so the window filtering and classification can be pinned in tests
/// with a fixed clock.
pub fn aggregate(candles: &[Candle], now_ms: i64) -> VolumeDelta {
    let mut windows = BTreeMap::new();

    for (label, hours) in WINDOWS {
        let cutoff = now_ms - (hours * 3_600_000.0) as i64;
        let mut bull = 0.0;
        let mut bear = 0.0;
        for c in candles {
            if c.open_time < cutoff {
                continue;
            }
            if c.is_bullish() {
                bull += c.volume;
            } else {
                bear += c.volume;
            }
        }

        let bull = round_dp(bull, 2);
        let bear = round_dp(bear, 2);
        windows.insert(
            label.to_string(),
            VolumeWindowTotals {
                bull_vol: bull,
                bear_vol: bear,
                total_vol: round_dp(bull + bear, 2),
            },
        );
    }

    let total_24h = windows.get("24h").map(|w| w.total_vol).unwrap_or(0.0);

    let mut relative = BTreeMap::new();
    for label in RELATIVE_WINDOWS {
        let hours = WINDOWS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, h)| *h)
            .unwrap_or(0.0);
        let window_total = windows.get(label).map(|w| w.total_vol).unwrap_or(0.0);
        // Minimum denominator of 1 keeps the ratio finite on dead markets.
        let baseline = (total_24h * hours / 24.0).max(1.0);
        relative.insert(
            label.to_string(),
            classify_ratio(window_total / baseline).to_string(),
        );
    }

    VolumeDelta { windows, relative }
}

/// Fetch the 1-minute series and aggregate it.
pub async fn compute(
    market: &BinanceClient,
    symbol: &str,
    now_ms: i64,
) -> Result<VolumeDelta, BlockError> {
    let candles = market
        .get_klines(symbol, "1m", 1500)
        .await
        .map_err(|e| BlockError::upstream("C", e))?;

    Ok(aggregate(&candles, now_ms))
}
