// =============================================================================
// Shared types used across the market-pulse service
// =============================================================================

use serde::{Deserialize, Serialize};

/// One OHLCV candle as returned by the exchange kline endpoint.
///
/// Candles are immutable once fetched and always ordered ascending by
/// `open_time` within a series. No two candles in one series share an
/// `open_time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time in epoch milliseconds.
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Bar close time in epoch milliseconds.
    pub close_time: i64,
}

impl Candle {
    pub fn new(
        open_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        close_time: i64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
        }
    }

    /// A candle counts as bullish when it closed at or above its open.
    /// The volume-delta block buckets volume on exactly this comparison.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Typical price (HLC/3), used as the per-bar price for session VWAP.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Extract the close prices from a candle slice, oldest first.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullish_includes_doji() {
        // close == open counts as bullish (the >= comparison matters for
        // volume bucketing: bull + bear must always equal total).
        let c = Candle::new(0, 100.0, 101.0, 99.0, 100.0, 5.0, 59_999);
        assert!(c.is_bullish());
    }

    #[test]
    fn typical_price_is_hlc_mean() {
        let c = Candle::new(0, 10.0, 12.0, 9.0, 10.5, 1.0, 0);
        assert!((c.typical_price() - (12.0 + 9.0 + 10.5) / 3.0).abs() < 1e-12);
    }
}
