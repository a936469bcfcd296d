use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::meeting;
use sea_orm::DbErr;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::courses::get::MeetingResponse;
use crate::routes::courses::post::owned_course;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetTopicRequest {
    pub topic: String,
}

/// PUT /api/courses/{course_name}/meetings/{meeting_id}/topic
///
/// Fills in the meeting topic. The topic is write-once; a second attempt is
/// rejected with `409 Conflict`.
pub async fn set_meeting_topic(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path((course_name, meeting_id)): Path<(String, i64)>,
    Json(req): Json<SetTopicRequest>,
) -> impl IntoResponse {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<MeetingResponse>::error("Topik wajib diisi")),
        );
    }

    let owned = match owned_course(&state, &course_name, claims.sub).await {
        Ok(owned) => owned,
        Err((status, message)) => {
            return (status, Json(ApiResponse::<MeetingResponse>::error(message)));
        }
    };

    let found = match meeting::Model::get_by_id(state.db(), meeting_id).await {
        Ok(Some(m)) if m.course_id == owned.id => m,
        Ok(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<MeetingResponse>::error(
                    "Pertemuan tidak ditemukan",
                )),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<MeetingResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    match found.set_topic(state.db(), topic).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                MeetingResponse::from(updated),
                "Topik pertemuan disimpan",
            )),
        ),
        Err(DbErr::Custom(msg)) if msg.contains("sudah diisi") => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<MeetingResponse>::error(msg)),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<MeetingResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
