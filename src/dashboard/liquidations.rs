// =============================================================================
// Block L — 24h liquidation volumes (optional, credential-gated)
// =============================================================================
//
// The liquidation aggregator requires an API key supplied via the
// LIQUIDATION_API_KEY environment variable. A missing key is a handled
// Config failure for this block only: the dashboard still returns 200 with
// `dataLiq: null` and one `L:` error entry.

use serde::Serialize;

use crate::dashboard::round_dp;
use crate::error::{BlockError, UpstreamError};
use crate::runtime_config::RuntimeConfig;

/// The record served as `dataLiq`.
#[derive(Debug, Clone, Serialize)]
pub struct LiquidationSnapshot {
    #[serde(rename = "long24hUsd")]
    pub long_24h_usd: f64,
    #[serde(rename = "short24hUsd")]
    pub short_24h_usd: f64,
    #[serde(rename = "total24hUsd")]
    pub total_24h_usd: f64,
}

/// Fetch 24h long/short liquidation volumes for the configured symbol.
pub async fn compute(
    http: &reqwest::Client,
    config: &RuntimeConfig,
) -> Result<LiquidationSnapshot, BlockError> {
    let key = config
        .liquidation_api_key
        .as_deref()
        .ok_or_else(|| BlockError::config("L", "LIQUIDATION_API_KEY not set"))?;

    let wrap = |e: UpstreamError| BlockError::upstream("L", e);

    let url = format!(
        "{}/api/futures/liquidation/info?symbol={}&range=24h",
        config.liquidation_base_url, config.symbol
    );
    let body = fetch_json_with_key(http, &url, key).await.map_err(wrap)?;

    let data = &body["data"];
    let long = data["long24h"].as_f64();
    let short = data["short24h"].as_f64();
    let (long, short) = match (long, short) {
        (Some(l), Some(s)) => (l, s),
        _ => return Err(wrap(UpstreamError::shape("liquidation data missing"))),
    };

    Ok(LiquidationSnapshot {
        long_24h_usd: round_dp(long, 2),
        short_24h_usd: round_dp(short, 2),
        total_24h_usd: round_dp(long + short, 2),
    })
}

/// Like the shared JSON fetch helper, with the aggregator's API-key header
/// attached.
async fn fetch_json_with_key(
    http: &reqwest::Client,
    url: &str,
    api_key: &str,
) -> Result<serde_json::Value, UpstreamError> {
    let resp = http.get(url).header("X-API-KEY", api_key).send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }

    let body: serde_json::Value = resp.json().await?;
    Ok(body)
}
