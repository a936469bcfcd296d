use crate::response::ApiResponse;
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, Default)]
struct HealthData {
    status: &'static str,
}

/// GET /api/health
///
/// Liveness probe. Always returns `200 OK` while the process is up.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            HealthData { status: "ok" },
            "Service is healthy",
        )),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}
