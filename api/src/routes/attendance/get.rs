use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use db::models::{attendance_record, attendance_session};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::routes::attendance::common::{RecordResponse, SessionResponse, load_session_context};
use crate::services::storage;
use crate::state::AppState;
use crate::auth::AuthUser;

/// GET /api/courses/{course_name}/meetings/{meeting_id}/session
///
/// Returns the session for a meeting, including the caller's own record if
/// one exists. Students poll this to drive the countdown display.
pub async fn get_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path((course_name, meeting_id)): Path<(String, i64)>,
) -> impl IntoResponse {
    let ctx = match load_session_context(state.db(), &course_name, meeting_id).await {
        Ok(ctx) => ctx,
        Err((status, message)) => {
            return (status, Json(ApiResponse::<SessionResponse>::error(message)));
        }
    };

    let now = Utc::now();
    let mut session = ctx.session;

    // The expiry watcher only lives in the process that created the session,
    // so reconcile the display flag here when a view observes it stale.
    if session.is_available && session.is_expired(now) {
        match attendance_session::Model::mark_unavailable(state.db(), &session.id).await {
            Ok(()) => session.is_available = false,
            Err(e) => {
                tracing::warn!(error = %e, session = %session.id, "Failed to clear availability flag");
            }
        }
    }

    let record =
        match attendance_record::Model::find_for_student(state.db(), &session.id, &claims.nim)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<SessionResponse>::error(format!(
                        "Database error: {e}"
                    ))),
                );
            }
        };

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            SessionResponse::from_session(&session, record, now),
            "Session retrieved",
        )),
    )
}

#[derive(Debug, Serialize, Default)]
pub struct RecordWithEvidence {
    #[serde(flatten)]
    pub record: RecordResponse,
    /// URL of the stored face photo, or a placeholder when missing.
    pub face_url: String,
    pub room_url: String,
}

/// GET /api/courses/{course_name}/meetings/{meeting_id}/session/records
///
/// Lists every record in the session with evidence URLs for the lecturer
/// view. Missing evidence degrades to a placeholder URL rather than an
/// error.
pub async fn list_records(
    State(state): State<AppState>,
    Path((course_name, meeting_id)): Path<(String, i64)>,
) -> impl IntoResponse {
    let ctx = match load_session_context(state.db(), &course_name, meeting_id).await {
        Ok(ctx) => ctx,
        Err((status, message)) => {
            return (
                status,
                Json(ApiResponse::<Vec<RecordWithEvidence>>::error(message)),
            );
        }
    };

    let records = match attendance_record::Model::all_for_session(state.db(), &ctx.session.id).await
    {
        Ok(records) => records,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<RecordWithEvidence>>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    let base = format!("/api/courses/{course_name}/meetings/{meeting_id}/session/records");
    let meeting_label = ctx.meeting.label();

    let mut out = Vec::with_capacity(records.len());
    for r in records {
        let face_url = match &r.face_filename {
            Some(f)
                if storage::load_face_image(&ctx.course.name, &meeting_label, &r.student_nim, f)
                    .await
                    .is_some() =>
            {
                format!("{base}/{}/face", r.student_nim)
            }
            _ => storage::DEFAULT_FACE_URL.to_owned(),
        };
        let room_url = match &r.room_filename {
            Some(f)
                if storage::load_room_image(&ctx.course.name, &meeting_label, &r.student_nim, f)
                    .await
                    .is_some() =>
            {
                format!("{base}/{}/room", r.student_nim)
            }
            _ => storage::DEFAULT_ROOM_URL.to_owned(),
        };
        out.push(RecordWithEvidence {
            record: RecordResponse::from(r),
            face_url,
            room_url,
        });
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(out, "Records retrieved")),
    )
}

async fn serve_evidence(bytes: Option<Vec<u8>>, filename: &str) -> Response {
    match bytes {
        Some(bytes) => {
            let mime = mime_guess::from_path(filename).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<crate::auth::guards::Empty>::error(
                "Bukti kehadiran tidak ditemukan",
            )),
        )
            .into_response(),
    }
}

/// GET /api/courses/{course_name}/meetings/{meeting_id}/session/records/{nim}/face
pub async fn get_face_evidence(
    State(state): State<AppState>,
    Path((course_name, meeting_id, nim)): Path<(String, i64, String)>,
) -> Response {
    let ctx = match load_session_context(state.db(), &course_name, meeting_id).await {
        Ok(ctx) => ctx,
        Err((status, message)) => {
            return (
                status,
                Json(ApiResponse::<crate::auth::guards::Empty>::error(message)),
            )
                .into_response();
        }
    };

    let record =
        match attendance_record::Model::find_for_student(state.db(), &ctx.session.id, &nim).await {
            Ok(Some(r)) => r,
            _ => return serve_evidence(None, "").await,
        };

    match record.face_filename {
        Some(filename) => {
            let bytes =
                storage::load_face_image(&ctx.course.name, &ctx.meeting.label(), &nim, &filename)
                    .await;
            serve_evidence(bytes, &filename).await
        }
        None => serve_evidence(None, "").await,
    }
}

/// GET /api/courses/{course_name}/meetings/{meeting_id}/session/records/{nim}/room
pub async fn get_room_evidence(
    State(state): State<AppState>,
    Path((course_name, meeting_id, nim)): Path<(String, i64, String)>,
) -> Response {
    let ctx = match load_session_context(state.db(), &course_name, meeting_id).await {
        Ok(ctx) => ctx,
        Err((status, message)) => {
            return (
                status,
                Json(ApiResponse::<crate::auth::guards::Empty>::error(message)),
            )
                .into_response();
        }
    };

    let record =
        match attendance_record::Model::find_for_student(state.db(), &ctx.session.id, &nim).await {
            Ok(Some(r)) => r,
            _ => return serve_evidence(None, "").await,
        };

    match record.room_filename {
        Some(filename) => {
            let bytes =
                storage::load_room_image(&ctx.course.name, &ctx.meeting.label(), &nim, &filename)
                    .await;
            serve_evidence(bytes, &filename).await
        }
        None => serve_evidence(None, "").await,
    }
}
