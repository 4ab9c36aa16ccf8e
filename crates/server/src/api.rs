use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use portfolio_dashboard_core::models::{portfolio::PortfolioSnapshot, price::PriceSeries};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Read the holdings file, enrich it with live data and return the snapshot.
async fn get_portfolio(State(state): State<Arc<AppState>>) -> ApiResult<Json<PortfolioSnapshot>> {
    let snapshot = state.dashboard.load_snapshot(&state.holdings_path).await?;
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
struct HistoryQuery {
    symbol: Option<String>,
    period: Option<String>,
    interval: Option<String>,
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<PriceSeries>> {
    let symbol = query
        .symbol
        .ok_or_else(|| ApiError::BadRequest("query parameter `symbol` is required".into()))?;
    let series = state
        .dashboard
        .get_history(&symbol, query.period.as_deref(), query.interval.as_deref())
        .await?;
    Ok(Json(series))
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.dashboard.clear_caches();
    StatusCode::NO_CONTENT
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/portfolio", get(get_portfolio))
        .route("/history", get(get_history))
        .route("/cache/clear", post(clear_cache))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
