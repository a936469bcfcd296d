//! Attendance record persistence: a single conditional write per
//! (session, student), with no update path.

use crate::eligibility::PresenceMethod;
use chrono::Utc;
use db::models::attendance_record::{ActiveModel, AttendanceStatus, Entity, Model};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttendanceError {
    /// A record already exists for this student in this session. Surfaced by
    /// the storage layer's unique constraint, so two concurrent submissions
    /// cannot both win.
    #[error("Presensi sudah tercatat untuk sesi ini")]
    AlreadyRecorded,
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Evidence and method details accompanying an accepted presence decision.
#[derive(Debug, Clone)]
pub struct PresenceDetails {
    /// Best-effort reverse-geocoded address, already degraded to a
    /// placeholder by the caller when geocoding failed.
    pub location: Option<String>,
    pub face_filename: Option<String>,
    pub room_filename: Option<String>,
    pub method: PresenceMethod,
}

/// Writes a "hadir" record. Evidence uploads must already have completed;
/// this is the single point where the decision becomes durable.
pub async fn record_presence(
    db: &DatabaseConnection,
    session_id: &str,
    nim: &str,
    details: PresenceDetails,
) -> Result<Model, AttendanceError> {
    insert_record(
        db,
        session_id,
        nim,
        AttendanceStatus::Present,
        details.location,
        details.face_filename,
        details.room_filename,
        Some(details.method.as_str().to_owned()),
    )
    .await
}

/// Writes an explicit "tidak hadir" self-report. This path is not gated by
/// session expiry, but it still refuses to overwrite an existing record.
pub async fn record_absence(
    db: &DatabaseConnection,
    session_id: &str,
    nim: &str,
) -> Result<Model, AttendanceError> {
    insert_record(
        db,
        session_id,
        nim,
        AttendanceStatus::Absent,
        None,
        None,
        None,
        None,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn insert_record(
    db: &DatabaseConnection,
    session_id: &str,
    nim: &str,
    status: AttendanceStatus,
    location: Option<String>,
    face_filename: Option<String>,
    room_filename: Option<String>,
    method: Option<String>,
) -> Result<Model, AttendanceError> {
    let record = Model {
        session_id: session_id.to_owned(),
        student_nim: nim.to_owned(),
        status,
        time: Utc::now(),
        location,
        face_filename,
        room_filename,
        method,
    };

    let active = ActiveModel {
        session_id: Set(record.session_id.clone()),
        student_nim: Set(record.student_nim.clone()),
        status: Set(record.status.clone()),
        time: Set(record.time),
        location: Set(record.location.clone()),
        face_filename: Set(record.face_filename.clone()),
        room_filename: Set(record.room_filename.clone()),
        method: Set(record.method.clone()),
    };

    match Entity::insert(active).exec_without_returning(db).await {
        Ok(_) => Ok(record),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AttendanceError::AlreadyRecorded)
        }
        Err(e) => Err(e.into()),
    }
}
