use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::helpers::{
    get_request, json_request, make_test_app, make_test_app_with_face, present_request, read_json,
    seed_lecturer, seed_session, seed_student, send, session_uri, spawn_face_stub,
};

/// Center of the first configured campus zone.
const ZONE_LAT: f64 = -6.31628;
const ZONE_LNG: f64 = 106.79463;

#[tokio::test]
async fn absent_self_report_is_recorded_once() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = format!("{}/absent", session_uri("Sistem-Operasi", meeting.id));

    let response = send(&app, json_request(Method::POST, &uri, Some(&token), json!({}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "tidak hadir");
    assert_eq!(body["data"]["student_nim"], "2110511001");

    let response = send(&app, json_request(Method::POST, &uri, Some(&token), json!({}))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Anda sudah melakukan presensi");
}

#[tokio::test]
async fn absent_self_report_is_allowed_after_expiry() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    // Zero-minute window: the session is expired the moment it exists.
    let (_c, meeting, _s) = seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(0)).await;

    let uri = format!("{}/absent", session_uri("Sistem-Operasi", meeting.id));
    let response = send(&app, json_request(Method::POST, &uri, Some(&token), json!({}))).await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn present_is_blocked_after_expiry() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) = seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(0)).await;

    let uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        present_request(&uri, &token, ZONE_LAT, ZONE_LNG, false, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Tidak bisa presensi. Waktu telah habis");
}

#[tokio::test]
async fn present_is_blocked_outside_campus() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(&app, present_request(&uri, &token, 0.0, 0.0, false, None)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Anda tidak berada di area kampus");
}

#[tokio::test]
async fn duplicate_check_precedes_all_other_gates() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let absent_uri = format!("{}/absent", session_uri("Sistem-Operasi", meeting.id));
    send(
        &app,
        json_request(Method::POST, &absent_uri, Some(&token), json!({})),
    )
    .await;

    // Off-campus coordinates: the duplicate rejection must win anyway.
    let present_uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        present_request(&present_uri, &token, 0.0, 0.0, false, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Anda sudah melakukan presensi");
}

#[tokio::test]
async fn present_fails_with_bad_gateway_when_recognizer_is_down() {
    // Location passes via the zone, so the flow reaches the recognition
    // call, which points at a closed port in the test environment.
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        present_request(&uri, &token, ZONE_LAT, ZONE_LNG, false, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(
        body["message"],
        "Layanan pengenalan wajah tidak dapat dihubungi"
    );

    // A recognizer outage must not burn a face-match attempt.
    let session_id = meeting.attendance_session_id.as_deref().unwrap();
    assert_eq!(state.attempts().attempts(session_id, "2110511001"), 0);
}

#[tokio::test]
async fn exhausted_attempts_block_further_submissions() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, session) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    for _ in 0..5 {
        state.attempts().record_failure(&session.id, "2110511001");
    }

    // In-zone coordinates, so only the exhausted ceiling can reject here.
    // A 502 would mean the submission reached the recognizer anyway.
    let uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        present_request(&uri, &token, ZONE_LAT, ZONE_LNG, false, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["data"]["terminated"], true);
    assert_eq!(body["data"]["attempts"], 5);
    assert_eq!(
        body["message"],
        "Gagal mencocokkan wajah, kembali ke halaman presensi"
    );
}

#[tokio::test]
async fn accepted_presence_is_recorded_with_evidence() {
    let face_url = spawn_face_stub(json!({
        "predicted_label": "2110511001",
        "confidence": 0.95,
        "match": true,
    }))
    .await;
    let (app, state) = make_test_app_with_face(&face_url).await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, session) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    // One earlier failure, to show the counter clears on success.
    state.attempts().record_failure(&session.id, "2110511001");

    let uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        present_request(&uri, &token, ZONE_LAT, ZONE_LNG, false, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "hadir");
    assert_eq!(body["data"]["method"], "geolocation");
    // The geocoder points at a closed port, so the address degrades.
    assert_eq!(body["data"]["location"], "Lokasi tidak tersedia");
    assert!(body["data"]["room_filename"].is_null());

    // Face evidence was written under the session's evidence folder.
    let face_filename = body["data"]["face_filename"].as_str().unwrap();
    let evidence = util::paths::face_image_path(
        "Sistem-Operasi",
        "Pertemuan 1",
        "2110511001",
        face_filename,
    );
    assert!(evidence.exists());

    assert_eq!(state.attempts().attempts(&session.id, "2110511001"), 0);
}

#[tokio::test]
async fn campus_wifi_opt_in_satisfies_the_location_gate() {
    // Coordinates are far from campus, but the forwarded address sits in
    // the campus subnet; the flow must get past the location check and
    // reach the recognizer.
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        present_request(&uri, &token, 0.0, 0.0, true, Some("111.95.16.42")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn wifi_opt_in_outside_the_subnet_still_fails_location() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = format!("{}/present", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        present_request(&uri, &token, 0.0, 0.0, true, Some("198.51.100.9")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Anda tidak berada di area kampus");
}

#[tokio::test]
async fn session_view_includes_the_callers_record() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, session) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = session_uri("Sistem-Operasi", meeting.id);

    let response = send(&app, get_request(&uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["id"], session.id);
    assert!(body["data"]["record"].is_null());
    assert!(body["data"]["remaining_seconds"].as_i64().unwrap() > 0);

    let absent_uri = format!("{uri}/absent");
    send(
        &app,
        json_request(Method::POST, &absent_uri, Some(&token), json!({})),
    )
    .await;

    let response = send(&app, get_request(&uri, Some(&token))).await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["record"]["status"], "tidak hadir");
}

#[tokio::test]
async fn stale_availability_flag_is_cleared_on_view() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    // Expired at creation, with no watcher running in this process.
    let (_c, meeting, session) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(0)).await;
    assert!(session.is_available);

    let uri = session_uri("Sistem-Operasi", meeting.id);
    let response = send(&app, get_request(&uri, Some(&token))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["expired"], true);
    assert_eq!(body["data"]["is_available"], false);
}

#[tokio::test]
async fn records_view_is_lecturer_only() {
    let (app, state) = make_test_app().await;
    let (lecturer, lecturer_token) = seed_lecturer(state.db(), "0511001").await;
    let (_student, student_token) = seed_student(state.db(), "2110511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = session_uri("Sistem-Operasi", meeting.id);
    let absent_uri = format!("{uri}/absent");
    send(
        &app,
        json_request(Method::POST, &absent_uri, Some(&student_token), json!({})),
    )
    .await;

    let records_uri = format!("{uri}/records");

    let response = send(&app, get_request(&records_uri, Some(&student_token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, get_request(&records_uri, Some(&lecturer_token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "tidak hadir");
    // No evidence was uploaded; the view degrades to placeholders.
    assert_eq!(records[0]["face_url"], "/default-face.png");
    assert_eq!(records[0]["room_url"], "/default-room.png");
}

#[tokio::test]
async fn session_routes_404_before_a_session_exists() {
    let (app, state) = make_test_app().await;
    let (lecturer, _) = seed_lecturer(state.db(), "0511001").await;
    let (_student, token) = seed_student(state.db(), "2110511001").await;
    let seeded = db::models::course::Model::create(state.db(), "Basis-Data", lecturer.id)
        .await
        .unwrap();
    let meeting = db::models::meeting::Model::create_next(state.db(), seeded.id)
        .await
        .unwrap();

    let response = send(
        &app,
        get_request(&session_uri("Basis-Data", meeting.id), Some(&token)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Presensi belum dibuat untuk pertemuan ini");
}

#[tokio::test]
async fn lecturers_cannot_submit_presence() {
    let (app, state) = make_test_app().await;
    let (lecturer, lecturer_token) = seed_lecturer(state.db(), "0511001").await;
    let (_c, meeting, _s) =
        seed_session(state.db(), lecturer.id, "Sistem-Operasi", Some(30)).await;

    let uri = format!("{}/absent", session_uri("Sistem-Operasi", meeting.id));
    let response = send(
        &app,
        json_request(Method::POST, &uri, Some(&lecturer_token), json!({})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
