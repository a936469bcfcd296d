use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use serde::Serialize;

/// Represents an attendance session ("absensi") opened for one meeting.
///
/// Immutable after creation except for the availability flag; expiry is
/// evaluated by comparing the current time against `expired_at`, never by
/// mutating the row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    /// Time-based generated id, e.g. "absensi-1726473600000".
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub meeting_id: i64,
    pub is_available: bool,
    /// Human-readable creation timestamp, localized for display.
    pub date: String,
    pub created_at: DateTime<Utc>,
    /// Absence of an expiry means the session never expires.
    pub expired_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meeting::Entity",
        from = "Column::MeetingId",
        to = "super::meeting::Column::Id"
    )]
    Meeting,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::meeting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meeting.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

const DAY_NAMES: [&str; 7] = [
    "Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu",
];
const MONTH_NAMES: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus",
    "September", "Oktober", "November", "Desember",
];

/// Formats an instant as an Indonesian long date in Asia/Jakarta time,
/// e.g. "Senin, 02 September 2024 10.30".
pub fn localized_date(at: DateTime<Utc>) -> String {
    let wib = FixedOffset::east_opt(7 * 3600).unwrap();
    let local = at.with_timezone(&wib);
    format!(
        "{}, {:02} {} {} {:02}.{:02}",
        DAY_NAMES[local.weekday().num_days_from_sunday() as usize],
        local.day(),
        MONTH_NAMES[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute(),
    )
}

/// Generates a time-based session id from a creation instant.
pub fn generate_id(at: DateTime<Utc>) -> String {
    format!("absensi-{}", at.timestamp_millis())
}

impl Model {
    /// Creates a session for a meeting. `duration_minutes` of `None` means
    /// unlimited validity.
    pub async fn create(
        db: &DatabaseConnection,
        meeting_id: i64,
        duration_minutes: Option<i64>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let session = Self {
            id: generate_id(now),
            meeting_id,
            is_available: true,
            date: localized_date(now),
            created_at: now,
            expired_at: duration_minutes.map(|m| now + Duration::minutes(m)),
        };

        let active = ActiveModel {
            id: Set(session.id.clone()),
            meeting_id: Set(session.meeting_id),
            is_available: Set(session.is_available),
            date: Set(session.date.clone()),
            created_at: Set(session.created_at),
            expired_at: Set(session.expired_at),
        };
        Entity::insert(active).exec_without_returning(db).await?;

        Ok(session)
    }

    pub async fn get_by_id(
        db: &DatabaseConnection,
        id: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id.to_owned()).one(db).await
    }

    /// Clears the availability flag once the validity window has passed.
    /// The flag is display-only; expiry checks always compare timestamps.
    pub async fn mark_unavailable(db: &DatabaseConnection, id: &str) -> Result<(), DbErr> {
        let Some(session) = Self::get_by_id(db, id).await? else {
            return Ok(());
        };
        let mut active = session.into_active_model();
        active.is_available = Set(false);
        active.update(db).await?;
        Ok(())
    }

    /// Whether the session has passed its expiry at `now`. Sessions without
    /// an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expired_at {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }

    /// Remaining validity at `now`, clamped at zero. `None` means the
    /// session has no expiry configured.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expired_at
            .map(|expiry| (expiry - now).max(Duration::zero()))
    }
}
