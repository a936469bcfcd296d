use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use db::models::{attendance_record, attendance_session, course, meeting};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// The course, meeting, and session addressed by a session route.
pub struct SessionContext {
    pub course: course::Model,
    pub meeting: meeting::Model,
    pub session: attendance_session::Model,
}

/// Resolves the full course/meeting/session chain for a session route,
/// verifying that the meeting belongs to the course and actually hosts a
/// session.
pub async fn load_session_context(
    db: &DatabaseConnection,
    course_name: &str,
    meeting_id: i64,
) -> Result<SessionContext, (StatusCode, String)> {
    let internal = |e: sea_orm::DbErr| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {e}"),
        )
    };

    let course = course::Model::get_by_name(db, course_name)
        .await
        .map_err(internal)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Mata kuliah tidak ditemukan".to_owned(),
        ))?;

    let meeting = match meeting::Model::get_by_id(db, meeting_id)
        .await
        .map_err(internal)?
    {
        Some(m) if m.course_id == course.id => m,
        _ => {
            return Err((
                StatusCode::NOT_FOUND,
                "Pertemuan tidak ditemukan".to_owned(),
            ));
        }
    };

    let session_id = meeting.attendance_session_id.clone().ok_or((
        StatusCode::NOT_FOUND,
        "Presensi belum dibuat untuk pertemuan ini".to_owned(),
    ))?;

    let session = attendance_session::Model::get_by_id(db, &session_id)
        .await
        .map_err(internal)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Presensi belum dibuat untuk pertemuan ini".to_owned(),
        ))?;

    Ok(SessionContext {
        course,
        meeting,
        session,
    })
}

#[derive(Debug, Serialize, Default)]
pub struct RecordResponse {
    pub session_id: String,
    pub student_nim: String,
    pub status: String,
    pub time: String,
    pub location: Option<String>,
    pub face_filename: Option<String>,
    pub room_filename: Option<String>,
    pub method: Option<String>,
}

impl From<attendance_record::Model> for RecordResponse {
    fn from(r: attendance_record::Model) -> Self {
        Self {
            session_id: r.session_id,
            student_nim: r.student_nim,
            status: r.status.to_string(),
            time: r.time.to_rfc3339(),
            location: r.location,
            face_filename: r.face_filename,
            room_filename: r.room_filename,
            method: r.method,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct SessionResponse {
    pub id: String,
    pub is_available: bool,
    /// Localized human-readable creation date.
    pub date: String,
    pub created_at: String,
    pub expired_at: Option<String>,
    pub expired: bool,
    /// Seconds left in the validity window; `None` for unlimited sessions.
    pub remaining_seconds: Option<i64>,
    /// The caller's own record, when one exists.
    pub record: Option<RecordResponse>,
}

impl SessionResponse {
    pub fn from_session(
        session: &attendance_session::Model,
        record: Option<attendance_record::Model>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: session.id.clone(),
            is_available: session.is_available,
            date: session.date.clone(),
            created_at: session.created_at.to_rfc3339(),
            expired_at: session.expired_at.map(|t| t.to_rfc3339()),
            expired: session.is_expired(now),
            remaining_seconds: session.remaining(now).map(|d| d.num_seconds()),
            record: record.map(RecordResponse::from),
        }
    }
}
