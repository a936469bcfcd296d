use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Per-student attendance record within a session. Written exactly once; the
/// composite primary key makes the insert itself the at-most-once guard.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_nim: String,

    pub status: AttendanceStatus,
    pub time: DateTime<Utc>,
    /// Best-effort reverse-geocoded address of the capture location.
    pub location: Option<String>,
    pub face_filename: Option<String>,
    pub room_filename: Option<String>,
    /// Recorded method label ("direct", "campus WiFi", or "geolocation").
    pub method: Option<String>,
}

/// Attendance status, stored with the original Indonesian wire values.
#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "hadir")]
    #[serde(rename = "hadir")]
    #[strum(serialize = "hadir")]
    Present,

    #[sea_orm(string_value = "tidak hadir")]
    #[serde(rename = "tidak hadir")]
    #[strum(serialize = "tidak hadir")]
    Absent,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id"
    )]
    Session,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_for_student(
        db: &DatabaseConnection,
        session_id: &str,
        nim: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id((session_id.to_owned(), nim.to_owned()))
            .one(db)
            .await
    }

    pub async fn all_for_session(
        db: &DatabaseConnection,
        session_id: &str,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .all(db)
            .await
    }
}
