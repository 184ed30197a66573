//! Session layer - signed cookie holding an opaque token
//!
//! The cookie carries a random UUID; the `sessions` table maps it to a user.
//! Anything that does not resolve to a live session (missing cookie, bad
//! signature, unknown or expired token) is an anonymous viewer.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::db::{DbError, SessionRecord, SessionRepo};
use crate::http::error::Bounce;
use crate::http::flash::Flash;
use crate::state::AppState;

/// Name of the signed session cookie
pub const SESSION_COOKIE: &str = "clubhouse_session";

/// The logged-in user behind a request
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub user_id: i64,
    /// Display name shown in the page header
    pub first_name: String,
    pub email: String,
    #[serde(skip)]
    pub token: Uuid,
}

impl From<SessionRecord> for SessionUser {
    fn from(record: SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            first_name: record.first_name,
            email: record.email,
            token: record.token,
        }
    }
}

/// Whoever is making the request, possibly anonymous
#[derive(Debug, Clone, Default)]
pub struct Viewer(Option<SessionUser>);

impl Viewer {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn logged_in(user: SessionUser) -> Self {
        Self(Some(user))
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.0.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.0.is_some()
    }

    /// The logged-in user, or a bounce to `/login` with an optional flash.
    pub fn require(&self, flash: Option<Flash>) -> Result<SessionUser, Bounce> {
        match &self.0 {
            Some(user) => Ok(user.clone()),
            None => {
                let bounce = Bounce::to("/login");
                Err(match flash {
                    Some(flash) => bounce.with_flash(flash),
                    None => bounce,
                })
            }
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key().clone());
        let Some(token) = session_token(&jar) else {
            return Ok(Self::anonymous());
        };

        match resolve(state.pool(), token).await {
            Ok(Some(record)) => Ok(Self::logged_in(record.into())),
            Ok(None) => {
                tracing::debug!("Session cookie did not match a live session");
                Ok(Self::anonymous())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Session lookup failed, treating request as anonymous");
                Ok(Self::anonymous())
            }
        }
    }
}

/// Token from a verified session cookie, if any.
pub fn session_token(jar: &SignedCookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

async fn resolve(pool: &PgPool, token: Uuid) -> Result<Option<SessionRecord>, DbError> {
    let mut conn = pool.acquire().await?;
    SessionRepo::new(&mut conn).lookup(token).await
}

/// Create the session row and the cookie that carries its token.
pub async fn start_session(
    conn: &mut PgConnection,
    user_id: i64,
    ttl: chrono::Duration,
    secure: bool,
) -> Result<Cookie<'static>, DbError> {
    let token = SessionRepo::new(conn).create(user_id, ttl).await?;
    tracing::info!(user_id, "Session started");
    Ok(session_cookie(token, secure))
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: Uuid, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie that clears the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Delete the session row. Failures are logged; logging out always succeeds
/// from the browser's point of view because the cookie is dropped anyway.
pub async fn end_session(pool: &PgPool, token: Uuid) {
    if let Err(err) = delete_session(pool, token).await {
        tracing::warn!(error = %err, "Failed to delete session row");
    }
}

async fn delete_session(pool: &PgPool, token: Uuid) -> Result<bool, DbError> {
    let mut conn = pool.acquire().await?;
    SessionRepo::new(&mut conn).delete(token).await
}
