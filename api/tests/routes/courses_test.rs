use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::helpers::{
    get_request, json_request, make_test_app, read_json, seed_lecturer, seed_student, send,
};

#[tokio::test]
async fn lecturer_creates_course_and_meetings() {
    let (app, state) = make_test_app().await;
    let (_lecturer, token) = seed_lecturer(state.db(), "0511001").await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            json!({ "name": "Sistem-Operasi" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate name is refused.
    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            json!({ "name": "Sistem-Operasi" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    for _ in 0..2 {
        let response = send(
            &app,
            json_request(
                Method::POST,
                "/api/courses/Sistem-Operasi/meetings",
                Some(&token),
                json!({}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, get_request("/api/courses/Sistem-Operasi", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let meetings = body["data"]["meetings"].as_array().unwrap();
    assert_eq!(meetings.len(), 2);
    assert_eq!(meetings[0]["label"], "Pertemuan 1");
    assert_eq!(meetings[1]["label"], "Pertemuan 2");
}

#[tokio::test]
async fn student_cannot_create_a_course() {
    let (app, state) = make_test_app().await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            json!({ "name": "Sistem-Operasi" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_the_owning_lecturer_can_add_meetings() {
    let (app, state) = make_test_app().await;
    let (owner, _) = seed_lecturer(state.db(), "0511001").await;
    let (_other, other_token) = seed_lecturer(state.db(), "0511002").await;

    db::models::course::Model::create(state.db(), "Basis-Data", owner.id)
        .await
        .unwrap();

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/api/courses/Basis-Data/meetings",
            Some(&other_token),
            json!({}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Anda bukan pengampu mata kuliah ini");
}

#[tokio::test]
async fn meeting_topic_is_write_once() {
    let (app, state) = make_test_app().await;
    let (lecturer, token) = seed_lecturer(state.db(), "0511001").await;
    let seeded = db::models::course::Model::create(state.db(), "Basis-Data", lecturer.id)
        .await
        .unwrap();
    let meeting = db::models::meeting::Model::create_next(state.db(), seeded.id)
        .await
        .unwrap();

    let uri = format!("/api/courses/Basis-Data/meetings/{}/topic", meeting.id);

    let response = send(
        &app,
        json_request(Method::PUT, &uri, Some(&token), json!({ "topic": "Normalisasi" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["topic"], "Normalisasi");

    let response = send(
        &app,
        json_request(Method::PUT, &uri, Some(&token), json!({ "topic": "Indeks" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Topik pertemuan sudah diisi");
}

#[tokio::test]
async fn a_meeting_hosts_at_most_one_session() {
    let (app, state) = make_test_app().await;
    let (lecturer, token) = seed_lecturer(state.db(), "0511001").await;
    let seeded = db::models::course::Model::create(state.db(), "Basis-Data", lecturer.id)
        .await
        .unwrap();
    let meeting = db::models::meeting::Model::create_next(state.db(), seeded.id)
        .await
        .unwrap();

    let uri = format!("/api/courses/Basis-Data/meetings/{}/session", meeting.id);

    let response = send(
        &app,
        json_request(
            Method::POST,
            &uri,
            Some(&token),
            json!({ "duration_minutes": 30 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let id = body["data"]["id"].as_str().unwrap();
    assert!(id.starts_with("absensi-"));
    assert_eq!(body["data"]["expired"], false);
    assert!(body["data"]["remaining_seconds"].as_i64().unwrap() > 0);

    let response = send(
        &app,
        json_request(
            Method::POST,
            &uri,
            Some(&token),
            json!({ "duration_minutes": 30 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn session_without_duration_never_expires() {
    let (app, state) = make_test_app().await;
    let (lecturer, token) = seed_lecturer(state.db(), "0511001").await;
    let seeded = db::models::course::Model::create(state.db(), "Basis-Data", lecturer.id)
        .await
        .unwrap();
    let meeting = db::models::meeting::Model::create_next(state.db(), seeded.id)
        .await
        .unwrap();

    let uri = format!("/api/courses/Basis-Data/meetings/{}/session", meeting.id);
    let response = send(
        &app,
        json_request(
            Method::POST,
            &uri,
            Some(&token),
            json!({ "duration_minutes": null }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["expired"], false);
    assert!(body["data"]["remaining_seconds"].is_null());
    assert!(body["data"]["expired_at"].is_null());
}
