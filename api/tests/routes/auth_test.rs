use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::helpers::{
    get_request, json_request, make_test_app, multipart_request, read_json, seed_student, send,
};

#[tokio::test]
async fn lecturer_can_register_and_login() {
    let (app, _state) = make_test_app().await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register-lecturer",
            None,
            json!({
                "nim": "0511001",
                "name": "Dr. Andi Wijaya",
                "email": "andi@upnvj.ac.id",
                "password": "rahasia123"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["lecturer"], true);
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "nim": "0511001", "password": "rahasia123" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["nim"], "0511001");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (app, state) = make_test_app().await;
    seed_student(state.db(), "2110511001").await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "nim": "2110511001", "password": "salah-total" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["message"], "NIM atau password salah");
}

#[tokio::test]
async fn login_with_unknown_nim_is_unauthorized() {
    let (app, _state) = make_test_app().await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "nim": "9999999999", "password": "rahasia123" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_registration_rejects_invalid_nim() {
    let (app, _state) = make_test_app().await;

    let response = send(
        &app,
        multipart_request(
            "/api/auth/register",
            None,
            &[
                ("nim", "12ab"),
                ("name", "Budi Santoso"),
                ("password", "rahasia123"),
            ],
            &[("face", "face.jpg", b"jpegbytes")],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "NIM harus berupa 10 digit angka");
}

#[tokio::test]
async fn student_registration_requires_a_face_photo() {
    let (app, _state) = make_test_app().await;

    let response = send(
        &app,
        multipart_request(
            "/api/auth/register",
            None,
            &[
                ("nim", "2110511001"),
                ("name", "Budi Santoso"),
                ("password", "rahasia123"),
            ],
            &[],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Minimal satu foto wajah diperlukan");
}

#[tokio::test]
async fn student_registration_fails_when_enrollment_service_is_down() {
    // The test environment points FACE_API_URL at a closed port, so
    // enrollment cannot succeed and no account may be created.
    let (app, state) = make_test_app().await;

    let response = send(
        &app,
        multipart_request(
            "/api/auth/register",
            None,
            &[
                ("nim", "2110511001"),
                ("name", "Budi Santoso"),
                ("password", "rahasia123"),
            ],
            &[("face", "face.jpg", b"jpegbytes")],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let found = db::models::user::Model::get_by_nim(state.db(), "2110511001")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn courses_require_authentication() {
    let (app, _state) = make_test_app().await;

    let response = send(&app, get_request("/api/courses", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_token_is_rejected() {
    let (app, _state) = make_test_app().await;

    let response = send(&app, get_request("/api/courses", Some("not-a-real-token"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
