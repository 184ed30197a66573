//! Event repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection};

use super::DbError;
use crate::models::NewEvent;

/// Event record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    /// Display date, already formatted at publish time
    pub date_str: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// Event repository
pub struct EventRepo<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// All events, newest first.
    pub async fn list(&mut self) -> Result<Vec<Event>, DbError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, date_str, category, description, content, image, created_at
            FROM events
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(events)
    }

    /// The `limit` most recently published events.
    pub async fn recent(&mut self, limit: i64) -> Result<Vec<Event>, DbError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, date_str, category, description, content, image, created_at
            FROM events
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(events)
    }

    pub async fn get(&mut self, id: i64) -> Result<Event, DbError> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, date_str, category, description, content, image, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "event",
            id: id.to_string(),
        })
    }

    pub async fn insert(&mut self, event: &NewEvent, image: &str) -> Result<i64, DbError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO events (title, date_str, category, description, content, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(event.title.as_str())
        .bind(event.date_str.as_deref())
        .bind(event.category.as_deref())
        .bind(event.description.as_deref())
        .bind(event.content.as_deref())
        .bind(image)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }
}
