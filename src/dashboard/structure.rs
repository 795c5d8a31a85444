// =============================================================================
// Block G — Market structure: daily pivots, session VWAP, 20-period range
// =============================================================================
//
// Three sub-computations, each with its own kline fetch, under ONE guard:
// any failed fetch degrades the whole block with a single `G:` error entry.
// This differs from blocks A/B, which guard per timeframe.
//
//   pivot   — classical floor-trader levels from the prior day's bar.
//   vwap    — session VWAP over 1-minute bars since UTC midnight, ±1σ band.
//   range20 — highest high / lowest low of the last twenty 15-minute bars.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::binance::BinanceClient;
use crate::dashboard::round_dp;
use crate::error::{BlockError, UpstreamError};
use crate::indicators::{pivots, vwap};

/// Pivot levels, 2 dp.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PivotSummary {
    pub p: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

/// Session VWAP with its ±1σ band, 2 dp.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VwapSummary {
    pub value: f64,
    pub upper: f64,
    pub lower: f64,
}

/// 20-period high/low, 2 dp.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RangeSummary {
    pub high20: f64,
    pub low20: f64,
}

/// The record served as `dataG`.
#[derive(Debug, Clone, Serialize)]
pub struct MarketStructure {
    pub pivot: PivotSummary,
    pub vwap: VwapSummary,
    pub range20: RangeSummary,
}

/// Fetch all three series and assemble the structure snapshot.
pub async fn compute(
    market: &BinanceClient,
    symbol: &str,
    now: DateTime<Utc>,
) -> Result<MarketStructure, BlockError> {
    let wrap = |e: UpstreamError| BlockError::upstream("G", e);

    // --- Daily pivots from the prior (completed) day ----------------------
    let daily = market.get_klines(symbol, "1d", 2).await.map_err(wrap)?;
    if daily.len() < 2 {
        return Err(wrap(UpstreamError::shape("not enough daily bars")));
    }
    // The last daily bar is the in-progress day; the one before is complete.
    let prior = &daily[daily.len() - 2];
    let levels = pivots::floor_pivots(prior.high, prior.low, prior.close)
        .ok_or_else(|| wrap(UpstreamError::shape("degenerate daily bar")))?;

    // --- Session VWAP since UTC midnight ----------------------------------
    let minutes = market.get_klines(symbol, "1m", 1500).await.map_err(wrap)?;
    let midnight_ms = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
        .timestamp_millis();
    let bands = vwap::session_vwap(&minutes, midnight_ms)
        .ok_or_else(|| wrap(UpstreamError::shape("no session bars for vwap")))?;

    // --- 20-period high/low on the 15m timeframe ---------------------------
    let quarter_hours = market.get_klines(symbol, "15m", 20).await.map_err(wrap)?;
    if quarter_hours.is_empty() {
        return Err(wrap(UpstreamError::shape("no 15m bars")));
    }
    let high20 = quarter_hours.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low20 = quarter_hours.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    Ok(MarketStructure {
        pivot: PivotSummary {
            p: round_dp(levels.pivot, 2),
            r1: round_dp(levels.r1, 2),
            r2: round_dp(levels.r2, 2),
            s1: round_dp(levels.s1, 2),
            s2: round_dp(levels.s2, 2),
        },
        vwap: VwapSummary {
            value: round_dp(bands.vwap, 2),
            upper: round_dp(bands.upper, 2),
            lower: round_dp(bands.lower, 2),
        },
        range20: RangeSummary {
            high20: round_dp(high20, 2),
            low20: round_dp(low20, 2),
        },
    })
}
