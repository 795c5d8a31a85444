// =============================================================================
// Block E — Crowd sentiment
// =============================================================================
//
// Two sentiment reads under one guard: CoinGecko's up-vote percentage for the
// coin page, and the alternative.me Fear & Greed index rendered in the
// `"{value} · {classification}"` form the front end shows verbatim.

use serde::Serialize;

use crate::dashboard::{fetch_json, round_dp};
use crate::error::{BlockError, UpstreamError};
use crate::runtime_config::RuntimeConfig;

/// The record served as `dataE`.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentSnapshot {
    #[serde(rename = "sentimentUpPct")]
    pub sentiment_up_pct: f64,
    #[serde(rename = "fearGreed")]
    pub fear_greed: String,
}

/// Fetch both sentiment sources and assemble the snapshot.
pub async fn compute(
    http: &reqwest::Client,
    config: &RuntimeConfig,
) -> Result<SentimentSnapshot, BlockError> {
    let wrap = |e: UpstreamError| BlockError::upstream("E", e);

    // --- CoinGecko coin sentiment ----------------------------------------
    let coin_url = format!("{}/api/v3/coins/bitcoin", config.coingecko_base_url);
    let coin = fetch_json(http, &coin_url).await.map_err(wrap)?;

    // The field moved between top level and community_data across CoinGecko
    // API versions; accept either.
    let up_pct = coin["sentiment_votes_up_percentage"]
        .as_f64()
        .or_else(|| coin["community_data"]["sentiment_votes_up_percentage"].as_f64())
        .ok_or_else(|| wrap(UpstreamError::shape("sentiment missing")))?;

    // --- Fear & Greed index ----------------------------------------------
    let fng_url = format!("{}/fng/?limit=1", config.fear_greed_base_url);
    let fng = fetch_json(http, &fng_url).await.map_err(wrap)?;

    let entry = fng["data"]
        .get(0)
        .ok_or_else(|| wrap(UpstreamError::shape("FNG missing")))?;

    let value = match &entry["value"] {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let classification = entry["value_classification"].as_str().unwrap_or("Unknown");

    Ok(SentimentSnapshot {
        sentiment_up_pct: round_dp(up_pct, 1),
        fear_greed: format!("{value} · {classification}"),
    })
}
