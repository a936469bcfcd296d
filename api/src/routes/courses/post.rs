use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use db::models::{attendance_session, course, meeting};
use sea_orm::{DatabaseConnection, DbErr};
use serde::Deserialize;
use services::session_clock::{CountdownState, SessionClock};

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::attendance::common::SessionResponse;
use crate::routes::courses::get::{CourseResponse, MeetingResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
}

/// POST /api/courses
///
/// Creates a course owned by the calling lecturer. Course names are unique;
/// a duplicate is rejected with `409 Conflict`.
pub async fn create_course(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateCourseRequest>,
) -> impl IntoResponse {
    let name = req.name.trim();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<CourseResponse>::error(
                "Nama mata kuliah wajib diisi",
            )),
        );
    }

    match course::Model::create(state.db(), name, claims.sub).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                CourseResponse::from(created),
                "Mata kuliah dibuat",
            )),
        ),
        Err(DbErr::Custom(msg)) if msg.contains("sudah ada") => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<CourseResponse>::error(msg)),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<CourseResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

/// Loads a course by name and verifies the caller is its lecturer.
pub(super) async fn owned_course(
    state: &AppState,
    course_name: &str,
    lecturer_id: i64,
) -> Result<course::Model, (StatusCode, String)> {
    let found = course::Model::get_by_name(state.db(), course_name)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {e}"),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Mata kuliah tidak ditemukan".to_owned(),
        ))?;

    if found.lecturer_id != lecturer_id {
        return Err((
            StatusCode::FORBIDDEN,
            "Anda bukan pengampu mata kuliah ini".to_owned(),
        ));
    }
    Ok(found)
}

/// POST /api/courses/{course_name}/meetings
///
/// Appends the next meeting to the course. The ordinal is derived from the
/// current meeting count, and the topic starts empty.
pub async fn create_meeting(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(course_name): Path<String>,
) -> impl IntoResponse {
    let owned = match owned_course(&state, &course_name, claims.sub).await {
        Ok(owned) => owned,
        Err((status, message)) => {
            return (status, Json(ApiResponse::<MeetingResponse>::error(message)));
        }
    };

    match meeting::Model::create_next(state.db(), owned.id).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                MeetingResponse::from(created),
                "Pertemuan dibuat",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<MeetingResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

/// Drives the availability flag for a timed session. The countdown task
/// ticks once per second; when it reaches `Expired` (or the clock is
/// already past its window), the flag is cleared in the database.
fn spawn_expiry_watcher(db: DatabaseConnection, session: attendance_session::Model) {
    let clock = SessionClock::start(session.expired_at);
    tokio::spawn(async move {
        let mut rx = clock.subscribe();
        while rx.changed().await.is_ok() {
            if matches!(*rx.borrow(), CountdownState::Expired) {
                break;
            }
        }
        if let Err(e) = attendance_session::Model::mark_unavailable(&db, &session.id).await {
            tracing::warn!(error = %e, session = %session.id, "Failed to clear availability flag");
        }
    });
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateSessionRequest {
    /// Validity window in minutes. `None` means the session never expires.
    pub duration_minutes: Option<i64>,
}

/// POST /api/courses/{course_name}/meetings/{meeting_id}/session
///
/// Opens the attendance session for a meeting. A meeting hosts at most one
/// session for its lifetime; reopening is rejected with `409 Conflict`.
pub async fn create_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path((course_name, meeting_id)): Path<(String, i64)>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let owned = match owned_course(&state, &course_name, claims.sub).await {
        Ok(owned) => owned,
        Err((status, message)) => {
            return (status, Json(ApiResponse::<SessionResponse>::error(message)));
        }
    };

    let found = match meeting::Model::get_by_id(state.db(), meeting_id).await {
        Ok(Some(m)) if m.course_id == owned.id => m,
        Ok(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<SessionResponse>::error(
                    "Pertemuan tidak ditemukan",
                )),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<SessionResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    if let Some(existing) = &found.attendance_session_id {
        return (
            StatusCode::CONFLICT,
            Json(ApiResponse::<SessionResponse>::error(format!(
                "Presensi sudah dibuat: {existing}"
            ))),
        );
    }

    let session =
        match attendance_session::Model::create(state.db(), found.id, req.duration_minutes).await {
            Ok(session) => session,
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<SessionResponse>::error(format!(
                        "Database error: {e}"
                    ))),
                );
            }
        };

    if let Err(e) = found.attach_session(state.db(), &session.id).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<SessionResponse>::error(format!(
                "Database error: {e}"
            ))),
        );
    }

    if session.expired_at.is_some() {
        spawn_expiry_watcher(state.db().clone(), session.clone());
    }

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            SessionResponse::from_session(&session, None, Utc::now()),
            "Presensi dibuat",
        )),
    )
}
