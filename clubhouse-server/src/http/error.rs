//! Page error types with IntoResponse
//!
//! Browser-facing pages never show raw errors. Expected exits (not logged
//! in, not an admin, invalid form) are a `Bounce`: a redirect carrying a
//! flash message. Everything else is logged and sends the visitor home.
//! The flash rides out as a [`Pending`] extension so it joins the messages
//! already queued for the visitor.

use axum::response::{IntoResponse, Redirect, Response};

use super::flash::{Flash, Pending};
use super::render::RenderError;
use super::upload::UploadError;
use crate::auth::PasswordError;
use crate::db::DbError;

/// Message shown when a request fails for an unexpected reason
pub const FAILURE_MESSAGE: &str = "An error occurred with the database connection.";

/// Where failed requests land
const SAFE_PAGE: &str = "/";

/// Redirect with an optional flash message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounce {
    pub to: String,
    pub flash: Option<Flash>,
}

impl Bounce {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            to: path.into(),
            flash: None,
        }
    }

    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::to(path).with_flash(Flash::warning(message))
    }

    pub fn danger(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::to(path).with_flash(Flash::danger(message))
    }
}

impl IntoResponse for Bounce {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.to).into_response();
        if let Some(message) = self.flash {
            response.extensions_mut().insert(Pending(message));
        }
        response
    }
}

/// Handler error type
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("redirect to {}", .0.to)]
    Bounce(Bounce),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<Bounce> for PageError {
    fn from(bounce: Bounce) -> Self {
        Self::Bounce(bounce)
    }
}

impl From<sqlx::Error> for PageError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DbError::Sqlx(e))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::Bounce(bounce) => bounce.into_response(),
            other => {
                // Log the actual error, show a generic message
                tracing::error!(error = %other, "Request failed");
                Bounce::danger(SAFE_PAGE, FAILURE_MESSAGE).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{LOCATION, SET_COOKIE};
    use axum::http::StatusCode;

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap()
    }

    fn pending(response: &Response) -> Option<&Flash> {
        response.extensions().get::<Pending>().map(|p| &p.0)
    }

    #[test]
    fn bounce_is_303_with_flash() {
        let response = Bounce::warning("/register", "Passwords do not match!").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register");
        assert_eq!(
            pending(&response),
            Some(&Flash::warning("Passwords do not match!"))
        );
    }

    #[test]
    fn bounce_leaves_the_cookie_to_the_middleware() {
        let response = Bounce::danger("/", "Access Denied!").into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn bare_bounce_has_no_flash() {
        let response = Bounce::to("/login").into_response();
        assert_eq!(location(&response), "/login");
        assert!(pending(&response).is_none());
    }

    #[test]
    fn database_error_redirects_home() {
        let err = PageError::from(sqlx::Error::PoolTimedOut);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert_eq!(pending(&response), Some(&Flash::danger(FAILURE_MESSAGE)));
    }

    #[test]
    fn bounce_converts_through_question_mark() {
        fn guarded() -> Result<(), PageError> {
            Err(Bounce::danger("/members", "Access Denied!"))?;
            Ok(())
        }
        let err = guarded().unwrap_err();
        assert!(matches!(err, PageError::Bounce(ref b) if b.to == "/members"));
    }
}
