//! Home page
//!
//! Runs on a plain pooled connection rather than a request transaction: a
//! failed query would abort the transaction and take the other list with it.
//! Each list degrades to empty on its own. Failed pages elsewhere redirect
//! here, so a failure to render this page ends in a plain error page.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{routing::get, Router};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::auth::Viewer;
use crate::db::{Article, ArticleRepo, DbError, Event, EventRepo};
use crate::http::error::PageError;
use crate::http::render::render_page;
use crate::state::AppState;

/// Articles and events shown on the home page
const RECENT_LIMIT: i64 = 3;

const UNAVAILABLE_PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n\
    <head><meta charset=\"utf-8\"><title>Unavailable</title></head>\n\
    <body><h1>Something went wrong</h1><p>Please try again later.</p></body>\n</html>\n";

/// GET /
async fn index(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let (articles, events) = recent_items(&state).await;
    render_home(&state, &viewer, jar, &articles, &events)
}

fn render_home(
    state: &AppState,
    viewer: &Viewer,
    jar: CookieJar,
    articles: &[Article],
    events: &[Event],
) -> Result<Response, PageError> {
    let data = json!({ "recent_articles": articles, "recent_events": events });
    match render_page(state, viewer, jar, "index", data) {
        Err(PageError::Render(err)) => {
            tracing::error!(error = %err, "Home page failed to render");
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(UNAVAILABLE_PAGE)).into_response())
        }
        other => other,
    }
}

async fn recent_items(state: &AppState) -> (Vec<Article>, Vec<Event>) {
    let mut conn = match state.pool().acquire().await {
        Ok(conn) => conn,
        Err(err) => {
            tracing::warn!(error = %err, "Home page could not get a connection");
            return (Vec::new(), Vec::new());
        }
    };

    let articles = ArticleRepo::new(&mut conn)
        .recent(RECENT_LIMIT)
        .await
        .unwrap_or_else(|err| empty("articles", err));
    let events = EventRepo::new(&mut conn)
        .recent(RECENT_LIMIT)
        .await
        .unwrap_or_else(|err| empty("events", err));

    (articles, events)
}

fn empty<T>(what: &'static str, err: DbError) -> Vec<T> {
    tracing::warn!(error = %err, list = what, "Home page list unavailable");
    Vec::new()
}

/// Home routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::header::LOCATION;
    use serde_json::Value;

    use crate::config::SiteConfig;
    use crate::db::create_lazy_pool;
    use crate::http::render::{RenderError, Templates};

    struct BrokenTemplates;

    impl Templates for BrokenTemplates {
        fn render(&self, name: &str, _context: &Value) -> Result<String, RenderError> {
            Err(RenderError::Template {
                name: name.to_owned(),
                reason: "missing block 'content'".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn render_failure_is_a_plain_error_page() {
        let pool = create_lazy_pool("postgres://clubhouse@127.0.0.1:1/clubhouse", 1).unwrap();
        let state = AppState::with_templates(pool, SiteConfig::default(), Arc::new(BrokenTemplates));

        let response =
            render_home(&state, &Viewer::anonymous(), CookieJar::new(), &[], &[]).unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(LOCATION).is_none());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Something went wrong"));
    }
}
