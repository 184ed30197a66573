//! One-shot flash messages carried in a cookie
//!
//! A redirect pushes a message; the next rendered page shows it and clears
//! the cookie. The cookie value is URL-safe base64 of a JSON list.
//! Responses built without the request's jar attach a [`Pending`] message
//! instead, and [`carry_over`] queues it behind what the visitor already has.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Name of the flash cookie
pub const FLASH_COOKIE: &str = "clubhouse_flash";

/// Keeps a runaway cookie under browser limits
const MAX_QUEUED: usize = 8;

/// Severity, used by templates as a CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Danger, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }
}

pub fn encode(flashes: &[Flash]) -> String {
    // Serializing plain structs of strings cannot fail
    let json = serde_json::to_vec(flashes).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a cookie value. Anything unreadable yields no messages.
pub fn decode(raw: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(raw)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Messages waiting in the request's cookies.
pub fn read(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

/// Queue a message behind any already waiting.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    let mut queued = read(&jar);
    queued.push(flash);
    if queued.len() > MAX_QUEUED {
        queued.drain(..queued.len() - MAX_QUEUED);
    }
    jar.add(flash_cookie(encode(&queued)))
}

/// Drop the flash cookie once its messages have been shown.
pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(FLASH_COOKIE).path("/").build())
}

/// A message waiting to be queued on the way out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending(pub Flash);

/// Middleware: move a response's [`Pending`] message into the flash cookie,
/// after any messages the request already carried.
pub async fn carry_over(jar: CookieJar, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<Pending>() {
        Some(Pending(message)) => (push(jar, message), response).into_response(),
        None => response,
    }
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let flashes = vec![
            Flash::success("Account created successfully! Please login."),
            Flash::danger("Access Denied!"),
        ];
        assert_eq!(decode(&encode(&flashes)), flashes);
    }

    #[test]
    fn garbage_cookie_is_ignored() {
        assert!(decode("%%%not base64").is_empty());
        assert!(decode(&URL_SAFE_NO_PAD.encode(b"{not json")).is_empty());
    }

    #[test]
    fn push_appends_to_waiting_messages() {
        let jar = push(CookieJar::new(), Flash::info("first"));
        let jar = push(jar, Flash::warning("second"));
        let queued = read(&jar);
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].message, "first");
        assert_eq!(queued[1].level, FlashLevel::Warning);
    }

    #[test]
    fn queue_is_bounded() {
        let mut jar = CookieJar::new();
        for i in 0..12 {
            jar = push(jar, Flash::info(format!("message {}", i)));
        }
        let queued = read(&jar);
        assert_eq!(queued.len(), MAX_QUEUED);
        assert_eq!(queued.last().unwrap().message, "message 11");
    }

    #[test]
    fn levels_serialize_lowercase() {
        let json = serde_json::to_value(Flash::danger("x")).unwrap();
        assert_eq!(json["level"], "danger");
    }
}
