use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{course, meeting};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Default)]
pub struct CourseResponse {
    pub id: i64,
    pub name: String,
    pub lecturer_id: i64,
}

impl From<course::Model> for CourseResponse {
    fn from(c: course::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            lecturer_id: c.lecturer_id,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct MeetingResponse {
    pub id: i64,
    pub ordinal: i32,
    pub label: String,
    pub topic: String,
    pub session_id: Option<String>,
}

impl From<meeting::Model> for MeetingResponse {
    fn from(m: meeting::Model) -> Self {
        let label = m.label();
        Self {
            id: m.id,
            ordinal: m.ordinal,
            label,
            topic: m.topic,
            session_id: m.attendance_session_id,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct CourseDetailResponse {
    pub course: CourseResponse,
    pub meetings: Vec<MeetingResponse>,
}

/// GET /api/courses
///
/// Lists all courses. Visible to every authenticated user; students pick
/// their course from this list.
pub async fn list_courses(State(state): State<AppState>) -> impl IntoResponse {
    match course::Model::get_all(state.db()).await {
        Ok(courses) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                courses
                    .into_iter()
                    .map(CourseResponse::from)
                    .collect::<Vec<_>>(),
                "Courses retrieved",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<CourseResponse>>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

/// GET /api/courses/{course_name}
///
/// Returns a course and its meetings in ordinal order.
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_name): Path<String>,
) -> impl IntoResponse {
    let found = match course::Model::get_by_name(state.db(), &course_name).await {
        Ok(found) => found,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<CourseDetailResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    let Some(found) = found else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<CourseDetailResponse>::error(
                "Mata kuliah tidak ditemukan",
            )),
        );
    };

    match found.meetings(state.db()).await {
        Ok(meetings) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CourseDetailResponse {
                    course: found.into(),
                    meetings: meetings.into_iter().map(MeetingResponse::from).collect(),
                },
                "Course retrieved",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<CourseDetailResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
