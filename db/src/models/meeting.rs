use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::Serialize;

/// Represents a meeting ("pertemuan") within a course. Meetings are created
/// sequentially and identified to users by their ordinal label.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "meetings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    /// 1-based position within the course; next ordinal = count + 1.
    pub ordinal: i32,
    /// Initially empty; set once.
    pub topic: String,
    /// Link to the live attendance session, if one has been opened.
    pub attendance_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Human-readable label, e.g. "Pertemuan 3".
    pub fn label(&self) -> String {
        format!("Pertemuan {}", self.ordinal)
    }

    /// Creates the next meeting for a course (ordinal = existing count + 1)
    /// with an empty topic.
    pub async fn create_next(
        db: &DatabaseConnection,
        course_id: i64,
    ) -> Result<Self, DbErr> {
        use sea_orm::PaginatorTrait;

        let count = Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .count(db)
            .await?;

        let now = Utc::now();
        let active = ActiveModel {
            course_id: Set(course_id),
            ordinal: Set(count as i32 + 1),
            topic: Set(String::new()),
            attendance_session_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn get_by_id(
        db: &DatabaseConnection,
        id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Sets the meeting topic. The topic is write-once: a second attempt is
    /// refused.
    pub async fn set_topic(self, db: &DatabaseConnection, topic: &str) -> Result<Self, DbErr> {
        if !self.topic.is_empty() {
            return Err(DbErr::Custom("Topik pertemuan sudah diisi".into()));
        }

        let mut active = self.into_active_model();
        active.topic = Set(topic.to_owned());
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    /// Links an attendance session to this meeting. A meeting hosts at most
    /// one session; a second create is refused before any session row exists.
    pub async fn attach_session(
        self,
        db: &DatabaseConnection,
        session_id: &str,
    ) -> Result<Self, DbErr> {
        if let Some(existing) = &self.attendance_session_id {
            return Err(DbErr::Custom(format!(
                "Presensi sudah dibuat: {existing}"
            )));
        }

        let mut active = self.into_active_model();
        active.attendance_session_id = Set(Some(session_id.to_owned()));
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }
}
