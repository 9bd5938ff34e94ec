use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bluecarbon::health::{self, HealthReport};
use bluecarbon::indices::dataset::catalog;
use bluecarbon::{IndexSeriesRequest, SeriesPoint, Variant};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Routes for the configured variant; `/health` and `/` exist only for `polygon`
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route("/get_ndvi_evi", post(get_ndvi_evi));
    if state.variant() == Variant::Polygon {
        router = router.route("/health", get(health_check)).route("/", get(home));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /get_ndvi_evi
async fn get_ndvi_evi(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<SeriesPoint>>, ApiError> {
    let request: IndexSeriesRequest = serde_json::from_slice(&body)?;
    tracing::debug!(?request, "Received request");

    // The platform client blocks until Earth Engine answers
    let series = tokio::task::spawn_blocking(move || state.series.run(&request)).await??;
    Ok(Json(series))
}

/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let report: HealthReport =
        tokio::task::spawn_blocking(move || health::check(state.series.platform())).await?;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(report)))
}

/// GET /
async fn home() -> Json<Value> {
    let datasets = catalog();
    let supported: Vec<&str> = datasets.iter().map(|d| d.id).collect();
    Json(json!({
        "message": "Blue Carbon NDVI/EVI API",
        "endpoints": {
            "/get_ndvi_evi": "POST - Get NDVI/EVI time series data",
            "/health": "GET - Health check",
        },
        "supported_datasets": supported,
        "datasets": datasets,
    }))
}
