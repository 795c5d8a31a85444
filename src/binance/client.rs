// =============================================================================
// Binance REST API Client — public market-data endpoints
// =============================================================================
//
// Only unauthenticated endpoints are used: spot klines plus the futures
// funding-rate and open-interest feeds. Base URLs are injected from the
// runtime config so tests can point the client at a local stub server.
//
// Failure policy: no retries. A non-2xx status or unexpected body shape is
// surfaced as an `UpstreamError`; the calling dashboard block converts it
// into one degraded-block entry and the sibling blocks carry on.
// =============================================================================

use tracing::{debug, instrument, warn};

use crate::error::UpstreamError;
use crate::types::Candle;

/// Binance REST client for public market data.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    spot_base_url: String,
    futures_base_url: String,
    client: reqwest::Client,
}

impl BinanceClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `BinanceClient` sharing an existing HTTP client.
    ///
    /// # Arguments
    /// * `spot_base_url`    — e.g. "https://api.binance.com"
    /// * `futures_base_url` — e.g. "https://fapi.binance.com"
    pub fn new(
        spot_base_url: impl Into<String>,
        futures_base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            spot_base_url: spot_base_url.into(),
            futures_base_url: futures_base_url.into(),
            client,
        }
    }

    // -------------------------------------------------------------------------
    // Spot market data
    // -------------------------------------------------------------------------

    /// GET /api/v3/klines.
    ///
    /// Returns a vector of [`Candle`] structs parsed from Binance's array-of-
    /// arrays response format.
    ///
    /// Array indices:
    ///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume,
    ///   [6] closeTime, ...
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, UpstreamError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.spot_base_url, symbol, interval, limit
        );

        let body = self.get_json(&url).await?;

        let raw = body
            .as_array()
            .ok_or_else(|| UpstreamError::shape("klines response is not an array"))?;

        let mut candles = Vec::with_capacity(raw.len());

        for entry in raw {
            let arr = entry
                .as_array()
                .ok_or_else(|| UpstreamError::shape("kline entry is not an array"))?;

            if arr.len() < 7 {
                warn!("skipping malformed kline entry with {} elements", arr.len());
                continue;
            }

            let open_time = arr[0].as_i64().unwrap_or(0);
            let open = parse_str_f64(&arr[1])?;
            let high = parse_str_f64(&arr[2])?;
            let low = parse_str_f64(&arr[3])?;
            let close = parse_str_f64(&arr[4])?;
            let volume = parse_str_f64(&arr[5])?;
            let close_time = arr[6].as_i64().unwrap_or(0);

            candles.push(Candle::new(
                open_time, open, high, low, close, volume, close_time,
            ));
        }

        debug!(symbol, interval, count = candles.len(), "klines fetched");
        Ok(candles)
    }

    // -------------------------------------------------------------------------
    // Futures market data
    // -------------------------------------------------------------------------

    /// GET /fapi/v1/fundingRate — historical funding rates, oldest first.
    #[instrument(skip(self), name = "binance::get_funding_rates")]
    pub async fn get_funding_rates(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<f64>, UpstreamError> {
        let url = format!(
            "{}/fapi/v1/fundingRate?symbol={}&limit={}",
            self.futures_base_url, symbol, limit
        );

        let body = self.get_json(&url).await?;

        let arr = body
            .as_array()
            .ok_or_else(|| UpstreamError::shape("fundingRate not array"))?;

        let rates: Vec<f64> = arr
            .iter()
            .map(|entry| {
                entry["fundingRate"]
                    .as_str()
                    .unwrap_or("0")
                    .parse()
                    .unwrap_or(0.0)
            })
            .collect();

        debug!(symbol, count = rates.len(), "funding rates fetched");
        Ok(rates)
    }

    /// GET /fapi/v1/openInterest — the current open interest in contracts.
    #[instrument(skip(self), name = "binance::get_open_interest")]
    pub async fn get_open_interest(&self, symbol: &str) -> Result<f64, UpstreamError> {
        let url = format!(
            "{}/fapi/v1/openInterest?symbol={}",
            self.futures_base_url, symbol
        );

        let body = self.get_json(&url).await?;

        let oi = body["openInterest"]
            .as_str()
            .ok_or_else(|| UpstreamError::shape("openInterest missing"))?
            .parse::<f64>()
            .map_err(|_| UpstreamError::shape("openInterest not numeric"))?;

        debug!(symbol, oi, "open interest fetched");
        Ok(oi)
    }

    /// GET /futures/data/openInterestHist — hourly open-interest history,
    /// oldest first. Returns the `sumOpenInterest` column.
    #[instrument(skip(self), name = "binance::get_open_interest_hist")]
    pub async fn get_open_interest_hist(
        &self,
        symbol: &str,
        period: &str,
        limit: u32,
    ) -> Result<Vec<f64>, UpstreamError> {
        let url = format!(
            "{}/futures/data/openInterestHist?symbol={}&period={}&limit={}",
            self.futures_base_url, symbol, period, limit
        );

        let body = self.get_json(&url).await?;

        let arr = body
            .as_array()
            .filter(|a| !a.is_empty() && a[0].get("sumOpenInterest").is_some())
            .ok_or_else(|| UpstreamError::shape("oiHist shape unexpected"))?;

        let history: Vec<f64> = arr
            .iter()
            .map(|entry| parse_str_f64(&entry["sumOpenInterest"]).unwrap_or(0.0))
            .collect();

        debug!(symbol, count = history.len(), "open interest history fetched");
        Ok(history)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Issue a GET and parse the body as JSON, failing on non-2xx statuses.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, UpstreamError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(body)
    }
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &serde_json::Value) -> Result<f64, UpstreamError> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .map_err(|_| UpstreamError::shape(format!("failed to parse '{s}' as f64")))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        Err(UpstreamError::shape(format!(
            "expected string or number, got: {val}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_str_f64_accepts_strings_and_numbers() {
        let s = serde_json::json!("123.45");
        let n = serde_json::json!(123.45);
        assert!((parse_str_f64(&s).unwrap() - 123.45).abs() < 1e-12);
        assert!((parse_str_f64(&n).unwrap() - 123.45).abs() < 1e-12);
    }

    #[test]
    fn parse_str_f64_rejects_other_types() {
        assert!(parse_str_f64(&serde_json::json!(null)).is_err());
        assert!(parse_str_f64(&serde_json::json!("abc")).is_err());
        assert!(parse_str_f64(&serde_json::json!([1, 2])).is_err());
    }
}
