// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicator catalogue served by
// the dashboard. Every public function returns `Option<T>` so callers are
// forced to handle insufficient-data and numerical-edge-case scenarios; the
// dashboard blocks substitute the legacy zero sentinels at the wire edge.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod pivots;
pub mod roc;
pub mod rsi;
pub mod vwap;
