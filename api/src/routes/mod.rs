//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Liveness probe (public)
//! - `/auth` → Registration and login (public)
//! - `/client-ip` → Client address echo used by the attendance page (public)
//! - `/courses` → Courses, meetings, and attendance sessions (authenticated;
//!   mutations and the records view are lecturer-only, presence submission
//!   is student-only)

use axum::{Router, middleware::from_fn, routing::get};

use crate::auth::guards::allow_authenticated;
use crate::routes::{auth::auth_routes, courses::courses_routes, health::health_routes};
use crate::state::AppState;

pub mod attendance;
pub mod auth;
pub mod common;
pub mod courses;
pub mod health;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .route("/client-ip", get(common::get_client_ip))
        .nest(
            "/courses",
            courses_routes().route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
