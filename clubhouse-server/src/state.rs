//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use futures::future::BoxFuture;
use sha2::{Digest, Sha512};
use sqlx::{PgConnection, PgPool};

use crate::auth::AdminList;
use crate::config::SiteConfig;
use crate::db::db_task;
use crate::http::error::PageError;
use crate::http::render::{FallbackTemplates, Templates};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    config: SiteConfig,
    cookie_key: Key,
    admins: AdminList,
    templates: Arc<dyn Templates>,
}

impl AppState {
    /// State rendering pages with the built-in fallback templates.
    pub fn new(pool: PgPool, config: SiteConfig) -> Self {
        Self::with_templates(pool, config, Arc::new(FallbackTemplates))
    }

    pub fn with_templates(pool: PgPool, config: SiteConfig, templates: Arc<dyn Templates>) -> Self {
        let cookie_key = derive_cookie_key(&config.secret_key);
        let admins = AdminList::new(&config.admins);
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                config,
                cookie_key,
                admins,
                templates,
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    pub fn cookie_key(&self) -> &Key {
        &self.inner.cookie_key
    }

    pub fn admins(&self) -> &AdminList {
        &self.inner.admins
    }

    pub fn templates(&self) -> &dyn Templates {
        self.inner.templates.as_ref()
    }

    /// Run `task` in a request transaction (see [`db_task`]).
    pub async fn transaction<T, F>(&self, task: F) -> Result<T, PageError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, PageError>>,
    {
        db_task(self.pool(), task).await
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key().clone()
    }
}

/// Stretch the configured secret into a 64-byte signing key.
fn derive_cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_secret_same_key() {
        let a = derive_cookie_key("local_secret_key");
        let b = derive_cookie_key("local_secret_key");
        let c = derive_cookie_key("another secret");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
