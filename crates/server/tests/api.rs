use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use portfolio_dashboard_core::errors::CoreError;
use portfolio_dashboard_core::models::price::PricePoint;
use portfolio_dashboard_core::models::quote::Quote;
use portfolio_dashboard_core::models::settings::DashboardConfig;
use portfolio_dashboard_core::providers::traits::{
    HistoryProvider, MetricPageProvider, QuoteProvider,
};
use portfolio_dashboard_core::PortfolioDashboard;
use portfolio_dashboard_server::{api::app_router, config::Config, AppState};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

// ═══════════════════════════════════════════════════════════════════
// Stub upstreams: fixed quotes, no pages, optional history
// ═══════════════════════════════════════════════════════════════════

struct StubQuotes;

#[async_trait]
impl QuoteProvider for StubQuotes {
    fn name(&self) -> &str {
        "StubQuotes"
    }

    async fn fetch_batch(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, CoreError> {
        Ok(symbols
            .iter()
            .filter(|s| s.as_str() == "TCS.NS")
            .map(|s| {
                (
                    s.clone(),
                    Quote {
                        price: Some(150.0),
                        ..Quote::default()
                    },
                )
            })
            .collect())
    }
}

struct NoPages;

#[async_trait]
impl MetricPageProvider for NoPages {
    fn name(&self) -> &str {
        "NoPages"
    }

    async fn fetch_page(&self, _page_symbol: &str) -> Result<String, CoreError> {
        Err(CoreError::Network("offline".into()))
    }
}

struct StubHistory {
    fail: bool,
}

#[async_trait]
impl HistoryProvider for StubHistory {
    fn name(&self) -> &str {
        "StubHistory"
    }

    async fn get_price_range(
        &self,
        _symbol: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<PricePoint>, CoreError> {
        if self.fail {
            return Err(CoreError::Api {
                provider: "StubHistory".into(),
                message: "symbol not found".into(),
            });
        }
        Ok(vec![
            PricePoint { timestamp: 1, close: 10.0 },
            PricePoint { timestamp: 2, close: 11.0 },
        ])
    }
}

fn app(holdings_path: &Path, history_fails: bool) -> Router {
    let config = Config::from_lookup(|_| None).unwrap();
    let dashboard = PortfolioDashboard::with_providers(
        DashboardConfig::default(),
        Arc::new(StubQuotes),
        Arc::new(NoPages),
        Some(Arc::new(StubHistory { fail: history_fails })),
    )
    .unwrap();
    app_router(AppState::new(dashboard, holdings_path), &config)
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Health
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn healthz_works() {
    let dir = tempdir().unwrap();
    let (status, body) = send(app(&dir.path().join("h.json"), false), "GET", "/api/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ok");
}

// ═══════════════════════════════════════════════════════════════════
// Portfolio
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn portfolio_returns_enriched_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("holdings.json");
    std::fs::write(
        &path,
        r#"[
            {"Particulars": "TCS", "Qty": 10, "Purchase Price": 100},
            {"Particulars": "Acme", "Qty": 2, "Purchase Price": 50, "CMP": 55},
        ]"#,
    )
    .unwrap();

    let (status, body) = send(app(&path, false), "GET", "/api/portfolio").await;
    assert_eq!(status, StatusCode::OK);

    let v = json(&body);
    assert!(v["lastUpdated"].is_string());
    assert_eq!(v["holdings"].as_array().unwrap().len(), 2);
    assert_eq!(v["holdings"][0]["presentValue"], 1500.0);
    assert_eq!(v["holdings"][0]["gainLossPct"], 0.5);
    assert_eq!(v["holdings"][1]["cmp"], 55.0);
    assert!(v["holdings"][1]["pe"].is_null());
    assert_eq!(v["totals"]["totalPresentValue"], 1610.0);
}

#[tokio::test]
async fn unparsable_holdings_file_is_500() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("holdings.json");
    std::fs::write(&path, "{{{ definitely not json").unwrap();

    let (status, body) = send(app(&path, false), "GET", "/api/portfolio").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v = json(&body);
    assert_eq!(v["code"], 500);
    assert!(v["message"].as_str().unwrap().starts_with("Invalid holdings file"));
}

#[tokio::test]
async fn missing_holdings_file_is_500() {
    let dir = tempdir().unwrap();
    let (status, body) = send(app(&dir.path().join("nope.json"), false), "GET", "/api/portfolio").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["message"]
        .as_str()
        .unwrap()
        .starts_with("File I/O error"));
}

// ═══════════════════════════════════════════════════════════════════
// History
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn history_returns_series() {
    let dir = tempdir().unwrap();
    let (status, body) = send(
        app(&dir.path().join("h.json"), false),
        "GET",
        "/api/history?symbol=tcs.ns&period=6mo&interval=1wk",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let v = json(&body);
    assert_eq!(v["symbol"], "TCS.NS");
    assert_eq!(v["period"], "6mo");
    assert_eq!(v["closes"], serde_json::json!([10.0, 11.0]));
}

#[tokio::test]
async fn history_validation_errors_are_400() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("h.json");

    let (status, _) = send(app(&path, false), "GET", "/api/history").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(&path, false), "GET", "/api/history?symbol=TCS.NS&period=3w").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        send(app(&path, false), "GET", "/api/history?symbol=TCS.NS&interval=7d").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["code"], 400);
}

#[tokio::test]
async fn history_upstream_failure_is_502() {
    let dir = tempdir().unwrap();
    let (status, body) = send(
        app(&dir.path().join("h.json"), true),
        "GET",
        "/api/history?symbol=NOPE.NS",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json(&body)["code"], 502);
}

// ═══════════════════════════════════════════════════════════════════
// Cache control + static fallback
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn cache_clear_is_204() {
    let dir = tempdir().unwrap();
    let (status, body) = send(app(&dir.path().join("h.json"), false), "POST", "/api/cache/clear").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn serves_index_html_for_unknown_route() {
    let static_dir = tempdir().unwrap();
    let index_path = static_dir.path().join("index.html");
    std::fs::write(&index_path, "<html>Dashboard</html>").unwrap();

    let static_service =
        ServeDir::new(static_dir.path()).fallback(ServeFile::new(index_path.clone()));
    let router = app(&static_dir.path().join("h.json"), false).fallback_service(static_service);

    let (status, body) = send(router, "GET", "/sectors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>Dashboard</html>");
}

// ═══════════════════════════════════════════════════════════════════
// Config
// ═══════════════════════════════════════════════════════════════════

#[test]
fn config_defaults() {
    let config = Config::from_lookup(|_| None).unwrap();
    assert_eq!(config.listen_addr.port(), 8080);
    assert_eq!(config.cors_allow, vec!["*".to_string()]);
    assert_eq!(config.dashboard, DashboardConfig::default());
}

#[test]
fn config_reads_overrides() {
    let dir = tempdir().unwrap();
    let tables = dir.path().join("tables.json");
    std::fs::write(
        &tables,
        r#"{"symbols": {"Acme": "ACME.NS"}, "sectors": {"Acme": "Widgets"}}"#,
    )
    .unwrap();
    let tables = tables.to_string_lossy().to_string();

    let env: HashMap<&str, String> = [
        ("PD_LISTEN_ADDR", "127.0.0.1:9000".to_string()),
        ("PD_HOLDINGS_PATH", "/srv/holdings.json".to_string()),
        ("PD_CORS_ALLOW_ORIGINS", "http://a.test, http://b.test".to_string()),
        ("PD_QUOTE_TTL_SECS", "5".to_string()),
        ("PD_METRIC_BASE_URL", "http://127.0.0.1:1234/quote".to_string()),
        ("PD_TABLES_PATH", tables),
    ]
    .into();
    let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

    assert_eq!(config.listen_addr.port(), 9000);
    assert_eq!(config.holdings_path, Path::new("/srv/holdings.json"));
    assert_eq!(config.cors_allow.len(), 2);
    assert_eq!(config.dashboard.quote_ttl_secs, 5);
    assert_eq!(config.dashboard.metric_base_url, "http://127.0.0.1:1234/quote");
    assert_eq!(config.dashboard.extra_symbols["Acme"], "ACME.NS");
    assert_eq!(config.dashboard.extra_sectors["Acme"], "Widgets");
}

#[test]
fn config_rejects_garbage() {
    assert!(Config::from_lookup(|k| (k == "PD_QUOTE_TTL_SECS").then(|| "soon".to_string())).is_err());
    assert!(Config::from_lookup(|k| (k == "PD_CACHE_SWEEP_SECS").then(|| "0".to_string())).is_err());
    assert!(Config::from_lookup(|k| (k == "PD_TABLES_PATH").then(|| "/no/such/file.json".to_string())).is_err());
}
