// =============================================================================
// Block B — Short-horizon momentum notes per timeframe
// =============================================================================
//
// Five bars per timeframe: the percent move from the first to the last close,
// plus the fixed advisory note the front end shows verbatim. The note ladder
// and its exact wording are part of the wire contract.

use serde::Serialize;

use crate::binance::BinanceClient;
use crate::dashboard::round_dp;
use crate::error::{BlockError, UpstreamError};
use crate::types;

/// The per-timeframe record served as `dataB[tf]`.
#[derive(Debug, Clone, Serialize)]
pub struct MomentumSnapshot {
    pub pct: f64,
    pub note: String,
}

/// Classify a 5-bar move into the advisory note.
///
/// `last_up` breaks the inside-range tie: whether the most recent close is
/// above the one before it.
pub fn note_for(pct: f64, last_up: bool) -> &'static str {
    if pct >= 1.5 {
        "strong up-move – breakout long / exit shorts"
    } else if pct >= 0.5 {
        "bullish drift – long bias"
    } else if pct <= -1.5 {
        "strong down-move – breakout short / exit longs"
    } else if pct <= -0.5 {
        "bearish drift – short bias"
    } else if last_up {
        "range base – possible long reversal"
    } else {
        "range top – possible short reversal"
    }
}

/// Fetch the last five bars of one timeframe and classify the move.
pub async fn compute(
    market: &BinanceClient,
    symbol: &str,
    timeframe: &str,
) -> Result<MomentumSnapshot, BlockError> {
    let key = format!("B[{timeframe}]");

    let candles = market
        .get_klines(symbol, timeframe, 5)
        .await
        .map_err(|e| BlockError::upstream(&key, e))?;

    let closes = types::closes(&candles);
    if closes.len() < 2 || closes[0] == 0.0 {
        return Err(BlockError::upstream(
            &key,
            UpstreamError::shape("not enough kline data"),
        ));
    }

    let first = closes[0];
    let last = closes[closes.len() - 1];
    let pct = (last - first) / first * 100.0;
    let last_up = last > closes[closes.len() - 2];

    Ok(MomentumSnapshot {
        pct: round_dp(pct, 2),
        note: note_for(pct, last_up).to_string(),
    })
}
