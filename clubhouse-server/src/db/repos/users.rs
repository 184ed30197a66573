//! User repository
//!
//! - insert: ON CONFLICT (LOWER(email)) DO NOTHING, `None` means the email is taken
//! - members: users with a team, grouped by team then role

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection};

use super::DbError;
use crate::models::{NewUser, ProfileUpdate};

/// User record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    /// Argon2 PHC string, never rendered
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Option<String>,
    pub team: Option<String>,
    pub profile_image: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone_number, password, \
                            role, team, profile_image, bio, created_at";

/// User repository
pub struct UserRepo<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> UserRepo<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    /// Look up by email, ignoring case.
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1"
        ))
        .bind(email.trim())
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    /// Insert a user. Returns `None` when the email is already registered,
    /// compared case-insensitively.
    pub async fn insert(&mut self, user: &NewUser) -> Result<Option<i64>, DbError> {
        let id: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO users
                (first_name, last_name, email, phone_number, password, role, team, profile_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (LOWER(email)) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.phone_number.as_deref())
        .bind(&user.password_hash)
        .bind(user.role.as_deref())
        .bind(user.team.as_deref())
        .bind(&user.profile_image)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(id.map(|(id,)| id))
    }

    pub async fn update_profile(&mut self, id: i64, update: &ProfileUpdate) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $1, last_name = $2, phone_number = $3, bio = $4
            WHERE id = $5
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.phone_number.as_deref())
        .bind(update.bio.as_deref())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "user",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn set_profile_image(&mut self, id: i64, filename: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE users SET profile_image = $1 WHERE id = $2")
            .bind(filename)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    /// Members directory: everyone assigned to a team.
    pub async fn list_members(&mut self) -> Result<Vec<User>, DbError> {
        let members = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE team IS NOT NULL ORDER BY team, role"
        ))
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@club.org".into(),
            phone_number: None,
            password: "$argon2id$secret".into(),
            role: Some("Member".into()),
            team: None,
            profile_image: "profile.jpg".into(),
            bio: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ada@club.org");
    }
}
