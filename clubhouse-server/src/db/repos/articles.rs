//! Article repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection};

use super::DbError;
use crate::models::NewArticle;

/// Article record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub image: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Article repository
pub struct ArticleRepo<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ArticleRepo<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// All articles, newest first.
    pub async fn list(&mut self) -> Result<Vec<Article>, DbError> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, subject, image, summary, content, created_at
            FROM articles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(articles)
    }

    pub async fn recent(&mut self, limit: i64) -> Result<Vec<Article>, DbError> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, subject, image, summary, content, created_at
            FROM articles
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(articles)
    }

    pub async fn get(&mut self, id: i64) -> Result<Article, DbError> {
        sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, subject, image, summary, content, created_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "article",
            id: id.to_string(),
        })
    }

    /// Insert an article stamped with `created_at`.
    pub async fn insert(
        &mut self,
        article: &NewArticle,
        image: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO articles (title, author, subject, image, summary, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(article.title.as_str())
        .bind(article.author.as_deref())
        .bind(article.subject.as_deref())
        .bind(image)
        .bind(article.summary.as_deref())
        .bind(article.content.as_deref())
        .bind(created_at)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }
}
