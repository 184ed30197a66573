//! Page rendering seam
//!
//! Handlers build a JSON context and hand it to a [`Templates`]
//! implementation. The site's real HTML templates plug in through that
//! trait; [`FallbackTemplates`] keeps the server usable without them.

use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Map, Value};

use super::error::PageError;
use super::flash;
use crate::auth::Viewer;
use crate::state::AppState;

/// Every page the site renders
pub const PAGES: &[&str] = &[
    "index",
    "login",
    "register",
    "profile",
    "edit_profile",
    "members",
    "add_member",
    "events",
    "add_event",
    "event_detail",
    "articles",
    "article_detail",
    "add_article",
];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    /// Reported by [`Templates`] implementations plugged in with
    /// `AppState::with_templates` when a known page fails to render.
    #[error("template '{name}' failed: {reason}")]
    Template { name: String, reason: String },

    #[error("context serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Template engine behind the pages
pub trait Templates: Send + Sync + 'static {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError>;
}

/// Minimal HTML shell: flash messages plus the page context as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTemplates;

impl Templates for FallbackTemplates {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        if !PAGES.contains(&name) {
            return Err(RenderError::UnknownTemplate(name.to_owned()));
        }

        let mut flashes = String::new();
        if let Some(list) = context.get("flashes").and_then(Value::as_array) {
            for item in list {
                let level = item.get("level").and_then(Value::as_str).unwrap_or("info");
                let message = item.get("message").and_then(Value::as_str).unwrap_or_default();
                flashes.push_str(&format!(
                    "<li class=\"flash flash-{}\">{}</li>",
                    escape_html(level),
                    escape_html(message)
                ));
            }
        }

        let data = escape_script_json(&serde_json::to_string(context)?);

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{name}</title></head>\n\
             <body data-page=\"{name}\">\n<ul class=\"flashes\">{flashes}</ul>\n\
             <script type=\"application/json\" id=\"page-data\">{data}</script>\n</body>\n</html>\n"
        ))
    }
}

/// Render `template` with `data` plus the viewer and pending flash messages.
///
/// Flashes are consumed: the returned response clears the flash cookie.
pub fn render_page(
    state: &AppState,
    viewer: &Viewer,
    jar: CookieJar,
    template: &'static str,
    data: Value,
) -> Result<Response, PageError> {
    let flashes = flash::read(&jar);

    let mut context = match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_owned(), other);
            map
        }
    };
    context.insert("viewer".to_owned(), viewer_context(state, viewer));
    context.insert("flashes".to_owned(), serde_json::to_value(&flashes).map_err(RenderError::from)?);

    let html = state.templates().render(template, &Value::Object(context))?;

    let jar = if flashes.is_empty() { jar } else { flash::clear(jar) };
    Ok((jar, Html(html)).into_response())
}

fn viewer_context(state: &AppState, viewer: &Viewer) -> Value {
    match viewer.user() {
        Some(user) => json!({
            "logged_in": true,
            "user_id": user.user_id,
            "username": user.first_name,
            "email": user.email,
            "is_admin": state.admins().is_admin(&user.email),
        }),
        None => json!({
            "logged_in": false,
            "is_admin": false,
        }),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON inside a script tag must not be able to close the tag
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
