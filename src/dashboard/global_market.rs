// =============================================================================
// Block F — Global market statistics
// =============================================================================
//
// One CoinGecko /global fetch: total market cap (reported in trillions of
// USD), its 24h change, and BTC/ETH dominance percentages.

use serde::Serialize;

use crate::dashboard::{fetch_json, round_dp};
use crate::error::{BlockError, UpstreamError};
use crate::runtime_config::RuntimeConfig;

/// The record served as `dataF`.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalMarketSnapshot {
    #[serde(rename = "totalMcapT")]
    pub total_mcap_t: f64,
    #[serde(rename = "mcap24hPct")]
    pub mcap_24h_pct: f64,
    #[serde(rename = "btcDominance")]
    pub btc_dominance: f64,
    #[serde(rename = "ethDominance")]
    pub eth_dominance: f64,
}

/// Fetch the global market stats and assemble the snapshot.
pub async fn compute(
    http: &reqwest::Client,
    config: &RuntimeConfig,
) -> Result<GlobalMarketSnapshot, BlockError> {
    let wrap = |e: UpstreamError| BlockError::upstream("F", e);

    let url = format!("{}/api/v3/global", config.coingecko_base_url);
    let body = fetch_json(http, &url).await.map_err(wrap)?;

    let data = &body["data"];
    let total_usd = data["total_market_cap"]["usd"]
        .as_f64()
        .ok_or_else(|| wrap(UpstreamError::shape("global missing")))?;

    Ok(GlobalMarketSnapshot {
        total_mcap_t: round_dp(total_usd / 1e12, 2),
        mcap_24h_pct: round_dp(
            data["market_cap_change_percentage_24h_usd"]
                .as_f64()
                .unwrap_or(0.0),
            2,
        ),
        btc_dominance: round_dp(data["market_cap_percentage"]["btc"].as_f64().unwrap_or(0.0), 2),
        eth_dominance: round_dp(data["market_cap_percentage"]["eth"].as_f64().unwrap_or(0.0), 2),
    })
}
