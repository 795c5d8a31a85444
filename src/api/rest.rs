// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Two paths, one payload:
//
//   GET /data        — HTML document embedding the JSON in a <pre> element
//   GET /data.json   — the JSON payload, with shared-cache headers
//   OPTIONS (either) — 204 preflight with the fixed CORS header set
//
// Every successful response carries `Access-Control-Allow-Origin: *`. The
// CORS contract mandates a 204 preflight with exactly three headers, so the
// headers are set directly in the handlers rather than through a middleware
// layer.
//
// A failure inside a block never reaches this layer (the builder degrades
// the block); only a serialization failure of the assembled payload becomes
// the 500 with the plain error body.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::app_state::AppState;
use crate::dashboard;

/// Build the REST router with shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/data", get(data_html).options(preflight))
        .route("/data.json", get(data_json).options(preflight))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// OPTIONS preflight: 204 with the fixed CORS header set and no body.
async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            ("access-control-allow-origin", "*"),
            ("access-control-allow-methods", "GET, OPTIONS"),
            ("access-control-allow-headers", "Content-Type"),
        ],
    )
}

/// GET /data.json — the raw payload with shared-cache headers.
async fn data_json(State(state): State<Arc<AppState>>) -> Response {
    let request_no = state.count_request();
    info!(request_no, path = "/data.json", "dashboard request");

    let payload = dashboard::build(&state).await;
    match serde_json::to_string(&payload) {
        Ok(body) => (
            [
                ("content-type", "application/json; charset=utf-8"),
                ("access-control-allow-origin", "*"),
                ("cache-control", "public, max-age=0, must-revalidate"),
                ("cdn-cache-control", "public, s-maxage=60, must-revalidate"),
            ],
            body,
        )
            .into_response(),
        Err(e) => total_failure(&e),
    }
}

/// GET /data — the payload embedded in a minimal HTML document.
async fn data_html(State(state): State<Arc<AppState>>) -> Response {
    let request_no = state.count_request();
    info!(request_no, path = "/data", "dashboard request");

    let payload = dashboard::build(&state).await;
    match serde_json::to_string(&payload) {
        Ok(json) => {
            let html = format!(
                "<!DOCTYPE html>\n<html><body><pre id=\"dashboard-data\">{json}</pre></body></html>"
            );
            (
                [
                    ("content-type", "text/html; charset=utf-8"),
                    ("access-control-allow-origin", "*"),
                ],
                html,
            )
                .into_response()
        }
        Err(e) => total_failure(&e),
    }
}

/// Total failure: no partial payload, just the plain 500 body.
fn total_failure(err: &serde_json::Error) -> Response {
    error!(error = %err, "failed to serialise dashboard payload");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [("content-type", "text/html; charset=utf-8")],
        "Service temporarily unavailable.",
    )
        .into_response()
}

// =============================================================================
// Tests — served over a real socket with every upstream unreachable
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_config::RuntimeConfig;

    /// Config whose upstream base URLs all point at a dead local port, so
    /// every block degrades with a transport error.
    fn dead_upstream_config() -> RuntimeConfig {
        let dead = "http://127.0.0.1:9".to_string();
        RuntimeConfig {
            spot_base_url: dead.clone(),
            futures_base_url: dead.clone(),
            fear_greed_base_url: dead.clone(),
            coingecko_base_url: dead.clone(),
            liquidation_base_url: dead,
            ..RuntimeConfig::default()
        }
    }

    /// Serve the real router on an ephemeral port and return its base URL.
    async fn spawn_api() -> String {
        let state = Arc::new(AppState::new(dead_upstream_config()));
        let app = router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn options_preflight_is_204_with_cors_headers() {
        let base = spawn_api().await;
        let client = reqwest::Client::new();

        for path in ["/data", "/data.json"] {
            let resp = client
                .request(reqwest::Method::OPTIONS, format!("{base}{path}"))
                .send()
                .await
                .unwrap();

            assert_eq!(resp.status(), 204, "{path}");
            let headers = resp.headers();
            assert_eq!(headers["access-control-allow-origin"], "*");
            assert_eq!(headers["access-control-allow-methods"], "GET, OPTIONS");
            assert_eq!(headers["access-control-allow-headers"], "Content-Type");
            assert!(resp.text().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn data_json_degrades_to_200_with_errors() {
        let base = spawn_api().await;
        let resp = reqwest::get(format!("{base}/data.json")).await.unwrap();

        assert_eq!(resp.status(), 200);
        let headers = resp.headers();
        assert!(headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["cache-control"], "public, max-age=0, must-revalidate");
        assert_eq!(
            headers["cdn-cache-control"],
            "public, s-maxage=60, must-revalidate"
        );

        let body: serde_json::Value = resp.json().await.unwrap();
        // Every upstream is down: null-shaped fields plus one error per block.
        assert!(body["dataD"]["fundingZ"].is_null());
        assert!(body["dataC"].is_null());
        assert!(body["dataA"].as_object().unwrap().is_empty());
        assert!(!body["errors"].as_array().unwrap().is_empty());
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn data_html_wraps_the_payload() {
        let base = spawn_api().await;
        let resp = reqwest::get(format!("{base}/data")).await.unwrap();

        assert_eq!(resp.status(), 200);
        let headers = resp.headers();
        assert!(headers["content-type"].to_str().unwrap().starts_with("text/html"));
        assert_eq!(headers["access-control-allow-origin"], "*");

        let body = resp.text().await.unwrap();
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("<pre id=\"dashboard-data\">"));
        assert!(body.contains("\"errors\""));
    }
}
