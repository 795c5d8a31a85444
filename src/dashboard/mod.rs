// =============================================================================
// Dashboard Builder — sequential block pipeline
// =============================================================================
//
// One request produces one `DashboardData`. Blocks run strictly in sequence
// (A through L); each returns a tagged result and the builder merges them,
// so there is no shared mutable accumulator — a failed block contributes its
// error entry and the null-shaped field, and every sibling block still runs.
//
// Suspension happens only at network-fetch boundaries. There are no retries:
// a failed fetch is a degraded block, not a failed request.

pub mod derivatives;
pub mod global_market;
pub mod liquidations;
pub mod momentum;
pub mod sentiment;
pub mod stress;
pub mod structure;
pub mod trend;
pub mod volume;

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::{BlockError, UpstreamError};

use derivatives::DerivativesSnapshot;
use global_market::GlobalMarketSnapshot;
use liquidations::LiquidationSnapshot;
use momentum::MomentumSnapshot;
use sentiment::SentimentSnapshot;
use stress::StressIndex;
use structure::MarketStructure;
use trend::{TrendIndicators, TIMEFRAMES};
use volume::VolumeDelta;

/// The full response payload, serialised once per request.
///
/// Field names are the wire contract with the dashboard front end; `errors`
/// carries one legacy-format string per degraded block.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    #[serde(rename = "dataA")]
    pub trend: BTreeMap<String, TrendIndicators>,
    #[serde(rename = "dataB")]
    pub momentum: BTreeMap<String, MomentumSnapshot>,
    #[serde(rename = "dataC")]
    pub volume: Option<VolumeDelta>,
    #[serde(rename = "dataD")]
    pub derivatives: DerivativesSnapshot,
    #[serde(rename = "dataE")]
    pub sentiment: Option<SentimentSnapshot>,
    #[serde(rename = "dataF")]
    pub global_market: Option<GlobalMarketSnapshot>,
    #[serde(rename = "dataG")]
    pub structure: Option<MarketStructure>,
    #[serde(rename = "dataH")]
    pub stress: StressIndex,
    #[serde(rename = "dataLiq")]
    pub liquidations: Option<LiquidationSnapshot>,
    pub errors: Vec<String>,
    /// Epoch milliseconds at assembly time — the only field that differs
    /// between two requests served from identical upstream responses.
    pub timestamp: i64,
}

/// Run every block in sequence and assemble the payload.
pub async fn build(state: &AppState) -> DashboardData {
    let config = state.config_snapshot();
    let symbol = config.symbol.clone();
    let now = Utc::now();

    let mut errors: Vec<BlockError> = Vec::new();

    // ── Block A: trend indicators per timeframe ─────────────────────────
    let mut trend_map = BTreeMap::new();
    for tf in TIMEFRAMES {
        match trend::compute(&state.market, &symbol, tf, config.kline_limit).await {
            Ok(set) => {
                trend_map.insert(tf.to_string(), set);
            }
            Err(e) => errors.push(e),
        }
    }

    // ── Block B: short-horizon momentum notes ───────────────────────────
    let mut momentum_map = BTreeMap::new();
    for tf in TIMEFRAMES {
        match momentum::compute(&state.market, &symbol, tf).await {
            Ok(snap) => {
                momentum_map.insert(tf.to_string(), snap);
            }
            Err(e) => errors.push(e),
        }
    }

    // ── Block C: volume delta windows ───────────────────────────────────
    let volume = match volume::compute(&state.market, &symbol, now.timestamp_millis()).await {
        Ok(delta) => Some(delta),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    // ── Block D: derivatives positioning ────────────────────────────────
    let derivatives = match derivatives::compute(&state.market, &symbol, config.funding_sample).await
    {
        Ok(snap) => snap,
        Err(e) => {
            errors.push(e);
            DerivativesSnapshot::empty()
        }
    };

    // ── Block E: crowd sentiment ────────────────────────────────────────
    let sentiment = match sentiment::compute(&state.http, &config).await {
        Ok(snap) => Some(snap),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    // ── Block F: global market stats ────────────────────────────────────
    let global_market = match global_market::compute(&state.http, &config).await {
        Ok(snap) => Some(snap),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    // ── Block G: market structure ───────────────────────────────────────
    let structure = match structure::compute(&state.market, &symbol, now).await {
        Ok(snap) => Some(snap),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    // ── Block H: stress index (derived, never fails) ────────────────────
    let relative_1h = volume
        .as_ref()
        .and_then(|v| v.relative.get("1h"))
        .map(String::as_str);
    let stress = stress::compute(&derivatives, relative_1h, config.stress_threshold);

    // ── Block L: liquidations (credential-gated) ────────────────────────
    let liquidations = match liquidations::compute(&state.http, &config).await {
        Ok(snap) => Some(snap),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    for e in &errors {
        warn!(block = %e.key, kind = ?e.kind, message = %e.message, "dashboard block degraded");
    }
    info!(
        symbol = %symbol,
        degraded = errors.len(),
        "dashboard payload assembled"
    );

    DashboardData {
        trend: trend_map,
        momentum: momentum_map,
        volume,
        derivatives,
        sentiment,
        global_market,
        structure,
        stress,
        liquidations,
        errors: errors.iter().map(ToString::to_string).collect(),
        timestamp: Utc::now().timestamp_millis(),
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Issue a GET and parse the body as JSON, failing on non-2xx statuses.
///
/// Used by the non-exchange feed blocks; the exchange client has its own
/// equivalent.
pub(crate) async fn fetch_json(
    http: &reqwest::Client,
    url: &str,
) -> Result<serde_json::Value, UpstreamError> {
    let resp = http.get(url).send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }

    let body: serde_json::Value = resp.json().await?;
    Ok(body)
}

/// Round to `decimals` places, matching the front end's `+x.toFixed(n)`.
pub(crate) fn round_dp(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_dp_basics() {
        assert!((round_dp(3.14159, 2) - 3.14).abs() < 1e-12);
        assert!((round_dp(-2.36, 1) - -2.4).abs() < 1e-12);
        assert!((round_dp(123.4567, 0) - 123.0).abs() < 1e-12);
        assert!((round_dp(5.0, 2) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn payload_wire_keys() {
        let data = DashboardData {
            trend: BTreeMap::new(),
            momentum: BTreeMap::new(),
            volume: None,
            derivatives: DerivativesSnapshot::empty(),
            sentiment: None,
            global_market: None,
            structure: None,
            stress: stress::compute(&DerivativesSnapshot::empty(), None, 4.0),
            liquidations: None,
            errors: vec!["D: HTTP 500".to_string()],
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&data).unwrap();

        for key in [
            "dataA", "dataB", "dataC", "dataD", "dataE", "dataF", "dataG", "dataH", "dataLiq",
            "errors", "timestamp",
        ] {
            assert!(json.get(key).is_some(), "missing wire key {key}");
        }
        // Degraded blocks are null-shaped, never absent.
        assert!(json["dataC"].is_null());
        assert!(json["dataD"]["fundingZ"].is_null());
        assert_eq!(json["errors"][0], "D: HTTP 500");
    }
}
