use axum::http::StatusCode;

use crate::helpers::{get_request, make_test_app, read_json, send};

#[tokio::test]
async fn forwarded_header_takes_precedence() {
    let (app, _state) = make_test_app().await;

    let mut req = get_request("/api/client-ip", None);
    req.headers_mut().insert(
        "x-forwarded-for",
        "203.0.113.7, 10.0.0.1".parse().unwrap(),
    );

    let response = send(&app, req).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["ip"], "203.0.113.7");
}

#[tokio::test]
async fn falls_back_to_peer_address() {
    let (app, _state) = make_test_app().await;

    let response = send(&app, get_request("/api/client-ip", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["ip"], "127.0.0.1");
}
