//! Session repository - opaque token to user id
//!
//! Tokens are random UUIDs; only unexpired rows resolve.

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use super::DbError;

/// A live session joined with the fields pages need about its user
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub token: Uuid,
    pub user_id: i64,
    pub first_name: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Session repository
pub struct SessionRepo<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> SessionRepo<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Create a session for `user_id` valid for `ttl`.
    pub async fn create(&mut self, user_id: i64, ttl: Duration) -> Result<Uuid, DbError> {
        let expires_at = expiry_after(ttl)?;
        let token = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *self.conn)
        .await?;
        Ok(token)
    }

    /// Resolve a token, ignoring expired sessions.
    pub async fn lookup(&mut self, token: Uuid) -> Result<Option<SessionRecord>, DbError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT s.token, s.user_id, u.first_name, u.email, s.expires_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(record)
    }

    /// Delete a session. Returns whether a row was removed.
    pub async fn delete(&mut self, token: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop every expired session. Returns the number removed.
    pub async fn purge_expired(&mut self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }
}

fn expiry_after(ttl: Duration) -> Result<DateTime<Utc>, DbError> {
    Utc::now()
        .checked_add_signed(ttl)
        .ok_or(DbError::SessionTtl(ttl))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_in_the_future() {
        let expires = expiry_after(Duration::hours(2)).unwrap();
        assert!(expires > Utc::now() + Duration::minutes(119));
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let err = expiry_after(Duration::MAX).unwrap_err();
        assert!(matches!(err, DbError::SessionTtl(_)));
    }
}
