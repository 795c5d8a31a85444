// =============================================================================
// Block A — Trend indicators per timeframe
// =============================================================================
//
// One kline fetch per timeframe, then the full indicator catalogue over the
// closes: EMA50/EMA200, RSI14, Bollinger band width, ATR percent, MACD and
// two ROC horizons. Each timeframe is guarded independently: a failed fetch
// degrades that timeframe only, with an `A[tf]` error entry.

use serde::Serialize;

use crate::binance::BinanceClient;
use crate::dashboard::round_dp;
use crate::error::BlockError;
use crate::indicators::{atr, bollinger, ema, macd, roc, rsi};
use crate::types;

/// Timeframes blocks A and B report on.
pub const TIMEFRAMES: [&str; 4] = ["15m", "1h", "4h", "1d"];

/// MACD components at the latest bar, 2 dp.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MacdSummary {
    pub line: f64,
    pub signal: f64,
    pub hist: f64,
}

/// The per-timeframe indicator record served as `dataA[tf]`.
///
/// Short series produce `0` values rather than errors — the legacy sentinel
/// the front end renders as "warming up".
#[derive(Debug, Clone, Serialize)]
pub struct TrendIndicators {
    pub ema50: f64,
    pub ema200: f64,
    pub rsi14: f64,
    #[serde(rename = "bbPct")]
    pub bb_pct: f64,
    #[serde(rename = "atrPct")]
    pub atr_pct: f64,
    pub macd: MacdSummary,
    pub roc10: f64,
    pub roc20: f64,
}

/// Fetch one timeframe's klines and compute its indicator set.
pub async fn compute(
    market: &BinanceClient,
    symbol: &str,
    timeframe: &str,
    limit: u32,
) -> Result<TrendIndicators, BlockError> {
    let key = format!("A[{timeframe}]");

    let candles = market
        .get_klines(symbol, timeframe, limit)
        .await
        .map_err(|e| BlockError::upstream(&key, e))?;

    let closes = types::closes(&candles);
    // Zero/empty last close falls back to 1 so the percent-of-price fields
    // stay finite on degenerate data.
    let last = closes.last().copied().filter(|v| *v != 0.0).unwrap_or(1.0);

    let macd_summary = match macd::standard_macd(&closes) {
        Some(m) => MacdSummary {
            line: round_dp(m.line, 2),
            signal: round_dp(m.signal, 2),
            hist: round_dp(m.histogram, 2),
        },
        None => MacdSummary {
            line: 0.0,
            signal: 0.0,
            hist: 0.0,
        },
    };

    Ok(TrendIndicators {
        ema50: round_dp(ema::latest_ema(&closes, 50).unwrap_or(0.0), 2),
        ema200: round_dp(ema::latest_ema(&closes, 200).unwrap_or(0.0), 2),
        rsi14: round_dp(rsi::latest_rsi(&closes, 14).unwrap_or(0.0), 1),
        bb_pct: round_dp(
            bollinger::band_width_pct(&closes, 20, 2.0, last).unwrap_or(0.0),
            2,
        ),
        atr_pct: round_dp(atr::latest_atr_pct(&candles, 14, last).unwrap_or(0.0), 2),
        macd: macd_summary,
        roc10: round_dp(roc::latest_roc(&closes, 10).unwrap_or(0.0), 2),
        roc20: round_dp(roc::latest_roc(&closes, 20).unwrap_or(0.0), 2),
    })
}
