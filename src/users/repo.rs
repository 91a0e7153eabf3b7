use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub other_name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<Date>,
    pub city: Option<String>,
    pub additional_info: Option<String>,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

/// Fields for inserting a new user row.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub other_name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<Date>,
    pub city: Option<String>,
    pub additional_info: Option<String>,
    pub is_admin: bool,
}

/// Partial update; `None` keeps the stored value. The password hash is
/// never part of an update.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub other_name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<Date>,
    pub city: Option<String>,
    pub additional_info: Option<String>,
    pub is_admin: Option<bool>,
}

impl User {
    /// Find a user by email. Emails are matched case-sensitively.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, other_name,
                   phone, birthday, city, additional_info, is_admin, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, other_name,
                   phone, birthday, city, additional_info, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user row.
    pub async fn create(db: &PgPool, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, other_name,
                               phone, birthday, city, additional_info, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, email, password_hash, first_name, last_name, other_name,
                      phone, birthday, city, additional_info, is_admin, created_at
            "#,
        )
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.other_name)
        .bind(new.phone)
        .bind(new.birthday)
        .bind(new.city)
        .bind(new.additional_info)
        .bind(new.is_admin)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Apply a partial update. Returns `None` when the row does not exist.
    pub async fn update(db: &PgPool, id: i64, patch: UserPatch) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                other_name = COALESCE($5, other_name),
                phone = COALESCE($6, phone),
                birthday = COALESCE($7, birthday),
                city = COALESCE($8, city),
                additional_info = COALESCE($9, additional_info),
                is_admin = COALESCE($10, is_admin)
            WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name, other_name,
                      phone, birthday, city, additional_info, is_admin, created_at
            "#,
        )
        .bind(id)
        .bind(patch.email)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.other_name)
        .bind(patch.phone)
        .bind(patch.birthday)
        .bind(patch.city)
        .bind(patch.additional_info)
        .bind(patch.is_admin)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Delete a user row. Returns whether a row was removed.
    pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Page of users plus the total row count.
    pub async fn list(db: &PgPool, offset: i64, limit: i64) -> anyhow::Result<(Vec<User>, i64)> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, other_name,
                   phone, birthday, city, additional_info, is_admin, created_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;

        Ok((rows, total))
    }
}
