use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;

/// Represents an account in the `users` table: a student (identified by NIM)
/// or a lecturer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Institution-format student number (fixed-length numeric string).
    /// Lecturers use their staff number in the same column.
    pub nim: String,
    /// Display name.
    pub name: String,
    /// Institutional email address.
    pub email: String,
    /// Securely hashed password string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account is a lecturer.
    pub lecturer: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course::Entity")]
    Courses,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Expected NIM length for student accounts.
const NIM_LEN: usize = 10;

/// Returns true if `nim` is a valid institution-format student number.
pub fn is_valid_nim(nim: &str) -> bool {
    nim.len() == NIM_LEN && nim.bytes().all(|b| b.is_ascii_digit())
}

/// Derives the synthetic authentication email for a student number.
///
/// The credential used for login is never stored; it is recomputed from the
/// NIM on every authentication.
pub fn synthetic_email(nim: &str) -> String {
    format!("{nim}@mahasiswa.upnvj.ac.id")
}

impl Model {
    /// Creates a new account with an argon2-hashed password.
    ///
    /// Student accounts require a valid NIM; lecturer accounts are exempt
    /// from the fixed-length rule.
    pub async fn create(
        db: &DatabaseConnection,
        nim: &str,
        name: &str,
        email: &str,
        password: &str,
        lecturer: bool,
    ) -> Result<Self, DbErr> {
        if !lecturer && !is_valid_nim(nim) {
            return Err(DbErr::Custom(format!(
                "NIM harus berupa {NIM_LEN} digit angka"
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {e}")))?
            .to_string();

        let now = Utc::now();
        let active = ActiveModel {
            nim: Set(nim.to_owned()),
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(password_hash),
            lecturer: Set(lecturer),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn get_by_nim(
        db: &DatabaseConnection,
        nim: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find().filter(Column::Nim.eq(nim)).one(db).await
    }

    /// Verifies a NIM/password pair, returning the account on success.
    pub async fn verify_credentials(
        db: &DatabaseConnection,
        nim: &str,
        password: &str,
    ) -> Result<Option<Self>, DbErr> {
        let Some(user) = Self::get_by_nim(db, nim).await? else {
            return Ok(None);
        };

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| DbErr::Custom(format!("Corrupt password hash: {e}")))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
