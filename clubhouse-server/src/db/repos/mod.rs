//! Repository implementations for database access
//!
//! Each repository borrows a `&mut PgConnection`, so it runs inside
//! whatever transaction the request opened:
//! - Conflicts handled via ON CONFLICT (no check-then-insert)
//! - Simple ordering only; the session lookup is the one JOIN

pub mod articles;
pub mod events;
pub mod sessions;
pub mod users;

pub use articles::{Article, ArticleRepo};
pub use events::{Event, EventRepo};
pub use sessions::{SessionRecord, SessionRepo};
pub use users::{User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("session lifetime out of range: {0}")]
    SessionTtl(chrono::Duration),
}
