use axum::{Router, routing::post};

use crate::state::AppState;

pub mod post;

use post::{login, register, register_lecturer};

/// Routes under `/api/auth`. All endpoints here are public.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/register-lecturer", post(register_lecturer))
        .route("/login", post(login))
}
