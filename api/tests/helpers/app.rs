use api::auth::generate_jwt;
use api::routes::routes;
use api::services::face::FaceClient;
use api::services::geocode::GeocodeClient;
use api::state::AppState;
use axum::{
    Json, Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request},
    response::Response,
    routing::post,
};
use ctor::{ctor, dtor};
use db::models::{attendance_session, course, meeting, user};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use services::geofence::Geofence;
use std::convert::Infallible;
use std::net::SocketAddr;
use tower::ServiceExt;
use tower::util::BoxCloneService;

#[ctor]
fn setup_tests() {
    // Runs before any test thread starts, so mutating the process
    // environment is still safe here.
    unsafe {
        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("DATABASE_PATH", "./tmp/test.db");
        std::env::set_var("STORAGE_ROOT", "./tmp/test_storage");
        // TCP port 9 (discard) is never listening; recognition calls fail fast.
        std::env::set_var("FACE_API_URL", "http://127.0.0.1:9");
        std::env::set_var("GEOCODING_API_URL", "http://127.0.0.1:9");
        std::env::set_var("EMAIL_FROM_NAME", "Presensi");
    }
}

#[dtor]
fn cleanup_tests() {
    let _ = std::fs::remove_dir_all("./tmp");
}

pub type TestApp = BoxCloneService<Request<Body>, Response, Infallible>;

/// Builds an app over a fresh in-memory database and returns it together
/// with its state for direct seeding.
pub async fn make_test_app() -> (TestApp, AppState) {
    let db = setup_test_db().await;
    let state = AppState::new(db);

    let router = Router::new().nest("/api", routes(state.clone()));

    (router.into_service().boxed_clone(), state)
}

/// Like [`make_test_app`], but with the recognition client pointed at the
/// given URL instead of the closed port from the environment.
pub async fn make_test_app_with_face(face_url: &str) -> (TestApp, AppState) {
    let db = setup_test_db().await;
    let state = AppState::with_clients(
        db,
        Geofence::from_config(),
        FaceClient::new(face_url),
        GeocodeClient::new("http://127.0.0.1:9", ""),
    );

    let router = Router::new().nest("/api", routes(state.clone()));

    (router.into_service().boxed_clone(), state)
}

/// Serves a fixed recognition verdict on an ephemeral local port and
/// returns the base URL to hand to [`make_test_app_with_face`].
pub async fn spawn_face_stub(verdict: serde_json::Value) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind face stub");
    let addr = listener.local_addr().expect("face stub has no local addr");

    let router = Router::new().route(
        "/recognize-face",
        post(move || async move { Json(verdict) }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{addr}")
}

/// Peer address stamped onto every test request; `ConnectInfo` is normally
/// provided by the server glue, which `oneshot` bypasses.
pub fn peer_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 52100))
}

fn base_request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(peer_addr()));
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    base_request(Method::GET, uri, token)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    base_request(method, uri, token)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn text_part(name: &str, value: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    )
}

fn file_part(name: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"\r\n");
    out
}

/// Builds a multipart request from text fields and binary file fields.
pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(text_part(name, value).as_bytes());
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(&file_part(name, filename, bytes));
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    base_request(Method::POST, uri, token)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Builds a presence submission for the given session route.
pub fn present_request(
    uri: &str,
    token: &str,
    lat: f64,
    lng: f64,
    use_campus_wifi: bool,
    forwarded_for: Option<&str>,
) -> Request<Body> {
    let lat = lat.to_string();
    let lng = lng.to_string();
    let wifi = if use_campus_wifi { "true" } else { "false" };
    let mut req = multipart_request(
        uri,
        Some(token),
        &[
            ("latitude", &lat),
            ("longitude", &lng),
            ("use_campus_wifi", wifi),
        ],
        &[("face", "face.jpg", b"jpegbytes")],
    );
    if let Some(forwarded) = forwarded_for {
        req.headers_mut()
            .insert("x-forwarded-for", forwarded.parse().unwrap());
    }
    req
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &TestApp, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

/// Seeds a student account and returns it with a valid token.
pub async fn seed_student(db: &DatabaseConnection, nim: &str) -> (user::Model, String) {
    let email = user::synthetic_email(nim);
    let student = user::Model::create(db, nim, "Budi Santoso", &email, "rahasia123", false)
        .await
        .unwrap();
    let (token, _) = generate_jwt(&student);
    (student, token)
}

/// Seeds a lecturer account and returns it with a valid token.
pub async fn seed_lecturer(db: &DatabaseConnection, staff_no: &str) -> (user::Model, String) {
    let lecturer = user::Model::create(
        db,
        staff_no,
        "Dr. Andi Wijaya",
        "andi@upnvj.ac.id",
        "rahasia123",
        true,
    )
    .await
    .unwrap();
    let (token, _) = generate_jwt(&lecturer);
    (lecturer, token)
}

/// Seeds a course with one meeting hosting a live attendance session.
pub async fn seed_session(
    db: &DatabaseConnection,
    lecturer_id: i64,
    course_name: &str,
    duration_minutes: Option<i64>,
) -> (course::Model, meeting::Model, attendance_session::Model) {
    let seeded = course::Model::create(db, course_name, lecturer_id)
        .await
        .unwrap();
    let m = meeting::Model::create_next(db, seeded.id).await.unwrap();
    let session = attendance_session::Model::create(db, m.id, duration_minutes)
        .await
        .unwrap();
    let m = m.attach_session(db, &session.id).await.unwrap();
    (seeded, m, session)
}

/// Route to a meeting's session subtree.
pub fn session_uri(course_name: &str, meeting_id: i64) -> String {
    format!("/api/courses/{course_name}/meetings/{meeting_id}/session")
}
