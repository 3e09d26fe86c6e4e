//! Admin dashboard rollups.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use shared::ApiResponse;

use super::AppState;

pub async fn stats(State(state): State<AppState>) -> Response {
    info!("GET /api/dashboard/stats");
    Json(ApiResponse::success(state.dashboard.stats())).into_response()
}

pub async fn health(State(state): State<AppState>) -> Response {
    info!("GET /api/dashboard/health");
    Json(ApiResponse::success(state.dashboard.health())).into_response()
}
