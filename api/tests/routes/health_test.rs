use axum::http::StatusCode;

use crate::helpers::{get_request, make_test_app, read_json, send};

#[tokio::test]
async fn health_check_is_public() {
    let (app, _state) = make_test_app().await;

    let response = send(&app, get_request("/api/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}
