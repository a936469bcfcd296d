use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::user::{self, is_valid_nim, synthetic_email};
use serde::{Deserialize, Serialize};

use crate::auth::generate_jwt;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Default)]
pub struct UserResponse {
    pub id: i64,
    pub nim: String,
    pub name: String,
    pub email: String,
    pub lecturer: bool,
    pub token: String,
    pub expires_at: String,
}

impl UserResponse {
    fn from_user(user: user::Model) -> Self {
        let (token, expires_at) = generate_jwt(&user);
        Self {
            id: user.id,
            nim: user.nim,
            name: user.name,
            email: user.email,
            lecturer: user.lecturer,
            token,
            expires_at,
        }
    }
}

/// Fields collected from the student registration form.
#[derive(Default)]
struct RegisterForm {
    nim: String,
    name: String,
    password: String,
    faces: Vec<Vec<u8>>,
}

async fn read_register_form(mut multipart: Multipart) -> Result<RegisterForm, String> {
    let mut form = RegisterForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| "Form pendaftaran tidak valid".to_owned())?
    {
        match field.name().unwrap_or_default() {
            "nim" => form.nim = field.text().await.map_err(|_| "NIM tidak valid".to_owned())?,
            "name" => {
                form.name = field.text().await.map_err(|_| "Nama tidak valid".to_owned())?;
            }
            "password" => {
                form.password = field
                    .text()
                    .await
                    .map_err(|_| "Password tidak valid".to_owned())?;
            }
            "face" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| "Foto wajah tidak valid".to_owned())?;
                form.faces.push(bytes.to_vec());
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/auth/register
///
/// Registers a student account. The request is a multipart form carrying
/// `nim`, `name`, `password`, and one or more `face` photo parts.
///
/// Face enrollment runs first: every photo must be accepted by the
/// recognition service before the account is created. The student's email
/// is derived from the NIM, never taken from the form.
///
/// ### Responses
/// - `201 Created` with the account and a fresh token
/// - `400 Bad Request` on missing fields or an invalid NIM
/// - `409 Conflict` when the NIM is already registered
/// - `502 Bad Gateway` when face enrollment fails
pub async fn register(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    let form = match read_register_form(multipart).await {
        Ok(form) => form,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<UserResponse>::error(message)),
            );
        }
    };

    if !is_valid_nim(&form.nim) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<UserResponse>::error(
                "NIM harus berupa 10 digit angka",
            )),
        );
    }
    if form.name.trim().is_empty() || form.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<UserResponse>::error(
                "Nama wajib diisi dan password minimal 8 karakter",
            )),
        );
    }
    if form.faces.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<UserResponse>::error(
                "Minimal satu foto wajah diperlukan",
            )),
        );
    }

    match user::Model::get_by_nim(state.db(), &form.nim).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<UserResponse>::error("NIM sudah terdaftar")),
            );
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    }

    if let Err(e) = state.face().enroll(&form.nim, form.faces).await {
        tracing::error!(error = %e, nim = %form.nim, "Face enrollment failed");
        return (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<UserResponse>::error(
                "Pendaftaran wajah gagal, coba lagi",
            )),
        );
    }

    let email = synthetic_email(&form.nim);
    match user::Model::create(
        state.db(),
        &form.nim,
        form.name.trim(),
        &email,
        &form.password,
        false,
    )
    .await
    {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                UserResponse::from_user(created),
                "Pendaftaran berhasil",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<UserResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterLecturerRequest {
    pub nim: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register-lecturer
///
/// Registers a lecturer account. Lecturers authenticate with their staff
/// number in the same field students use for their NIM, and skip face
/// enrollment entirely.
pub async fn register_lecturer(
    State(state): State<AppState>,
    Json(req): Json<RegisterLecturerRequest>,
) -> impl IntoResponse {
    if req.nim.trim().is_empty() || req.name.trim().is_empty() || req.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<UserResponse>::error(
                "Nomor pegawai dan nama wajib diisi, password minimal 8 karakter",
            )),
        );
    }

    match user::Model::get_by_nim(state.db(), req.nim.trim()).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<UserResponse>::error(
                    "Nomor pegawai sudah terdaftar",
                )),
            );
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    }

    match user::Model::create(
        state.db(),
        req.nim.trim(),
        req.name.trim(),
        req.email.trim(),
        &req.password,
        true,
    )
    .await
    {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                UserResponse::from_user(created),
                "Pendaftaran berhasil",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<UserResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nim: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// Verifies a NIM/password pair and returns a fresh token. A wrong NIM and
/// a wrong password are indistinguishable in the response.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    match user::Model::verify_credentials(state.db(), req.nim.trim(), &req.password).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                UserResponse::from_user(user),
                "Login berhasil",
            )),
        ),
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<UserResponse>::error("NIM atau password salah")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<UserResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
