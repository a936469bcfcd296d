use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use serde::Serialize;

/// Represents a course ("mata kuliah"). The course name doubles as the key
/// used in routes and evidence-storage paths, so it must be unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Owning instructor (foreign key to `users`).
    pub lecturer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LecturerId",
        to = "super::user::Column::Id"
    )]
    Lecturer,
    #[sea_orm(has_many = "super::meeting::Entity")]
    Meetings,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecturer.def()
    }
}

impl Related<super::meeting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Creates a new course owned by `lecturer_id`. The name must be unique;
    /// a duplicate is reported as a custom error rather than a raw driver one.
    pub async fn create(
        db: &DatabaseConnection,
        name: &str,
        lecturer_id: i64,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            name: Set(name.to_owned()),
            lecturer_id: Set(lecturer_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                DbErr::Custom(format!("Mata kuliah '{name}' sudah ada"))
            } else {
                e
            }
        })
    }

    pub async fn get_by_name(
        db: &DatabaseConnection,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find().filter(Column::Name.eq(name)).one(db).await
    }

    pub async fn get_all(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find().all(db).await
    }

    pub async fn meetings(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<super::meeting::Model>, DbErr> {
        use sea_orm::QueryOrder;

        super::meeting::Entity::find()
            .filter(super::meeting::Column::CourseId.eq(self.id))
            .order_by_asc(super::meeting::Column::Ordinal)
            .all(db)
            .await
    }
}
