// =============================================================================
// Block D — Derivatives positioning
// =============================================================================
//
// Two independent signals from the futures API under one guard:
//
//   fundingZ   — z-score of the latest funding rate against the trailing
//                sample (population mean/σ over the most recent 42 rates).
//   oiDelta24h — percent change of current open interest against the oldest
//                point of the 24-hour hourly history.
//
// All fetches must succeed or the whole block degrades to the null-shaped
// placeholder with one `D:` error entry. Both values are fixed-precision
// strings on the wire; zero variance yields exactly "0.00".

use serde::Serialize;

use crate::binance::BinanceClient;
use crate::error::{BlockError, UpstreamError};

/// The record served as `dataD`. Unlike the other blocks this is never
/// `null` on the wire — failure produces the placeholder with null fields.
#[derive(Debug, Clone, Serialize)]
pub struct DerivativesSnapshot {
    #[serde(rename = "fundingZ")]
    pub funding_z: Option<String>,
    #[serde(rename = "oiDelta24h")]
    pub oi_delta_24h: Option<String>,
}

impl DerivativesSnapshot {
    /// The null-shaped placeholder reported when the block degrades.
    pub fn empty() -> Self {
        Self {
            funding_z: None,
            oi_delta_24h: None,
        }
    }
}

/// Z-score of the latest rate against the whole sample, formatted to 2 dp.
///
/// Returns "0.00" when the sample's population standard deviation is zero
/// (all rates identical) — never NaN and never a division error.
pub fn funding_z_score(rates: &[f64]) -> String {
    let n = rates.len() as f64;
    let mean = rates.iter().sum::<f64>() / n;
    let sd = (rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();

    if sd == 0.0 {
        return "0.00".to_string();
    }

    let last = rates[rates.len() - 1];
    format!("{:.2}", (last - mean) / sd)
}

/// Fetch funding rates plus open interest and derive both positioning values.
pub async fn compute(
    market: &BinanceClient,
    symbol: &str,
    funding_sample: usize,
) -> Result<DerivativesSnapshot, BlockError> {
    let wrap = |e: UpstreamError| BlockError::upstream("D", e);

    // --- Funding z-score ------------------------------------------------
    let rates = market.get_funding_rates(symbol, 1000).await.map_err(wrap)?;
    let sample: &[f64] = &rates[rates.len().saturating_sub(funding_sample)..];
    if sample.is_empty() {
        return Err(wrap(UpstreamError::shape("fundingRate history empty")));
    }
    let funding_z = funding_z_score(sample);

    // --- Open-interest 24h delta ----------------------------------------
    let oi_now = market.get_open_interest(symbol).await.map_err(wrap)?;
    let history = market
        .get_open_interest_hist(symbol, "1h", 24)
        .await
        .map_err(wrap)?;

    let baseline = history[0];
    if baseline == 0.0 {
        return Err(wrap(UpstreamError::shape("oiHist zero baseline")));
    }
    let oi_delta_24h = format!("{:.1}", (oi_now - baseline) / baseline * 100.0);

    Ok(DerivativesSnapshot {
        funding_z: Some(funding_z),
        oi_delta_24h: Some(oi_delta_24h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_score_zero_variance_is_exactly_0_00() {
        let rates = vec![0.0001; 42];
        assert_eq!(funding_z_score(&rates), "0.00");
    }

    #[test]
    fn z_score_single_observation() {
        // One rate: σ = 0, so the guard applies.
        assert_eq!(funding_z_score(&[0.0003]), "0.00");
    }

    #[test]
    fn z_score_known_value() {
        // Sample [1, 3]: mean 2, population σ 1, latest 3 => z = 1.00.
        assert_eq!(funding_z_score(&[1.0, 3.0]), "1.00");
    }

    #[test]
    fn z_score_negative_extreme() {
        // Latest far below the mean formats with a leading minus.
        let mut rates = vec![0.0002; 41];
        rates.push(-0.0008);
        let z: f64 = funding_z_score(&rates).parse().unwrap();
        assert!(z < -3.0, "expected deeply negative z, got {z}");
    }

    #[test]
    fn placeholder_serialises_null_fields() {
        let json = serde_json::to_value(DerivativesSnapshot::empty()).unwrap();
        assert!(json["fundingZ"].is_null());
        assert!(json["oiDelta24h"].is_null());
    }
}
