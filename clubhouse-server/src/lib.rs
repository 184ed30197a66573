//! clubhouse-server: the community site behind the `clubhouse` binary
//!
//! Accounts, a members directory, events and articles, served as
//! server-rendered pages over PostgreSQL.
//!
//! # Layout
//!
//! - `config`: site settings from defaults, TOML and environment
//! - `db`: pool, schema, per-request transactions and repositories
//! - `models`: validated form input
//! - `auth`: sessions, password hashing, admin allowlist
//! - `http`: router, pages, flash messages, uploads

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use config::{ConfigError, SiteConfig};
pub use http::{build_router, run_server, PageError, ServerError};
pub use state::AppState;
