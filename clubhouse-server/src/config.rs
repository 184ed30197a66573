//! Site configuration - defaults, TOML file, environment
//!
//! Settings are resolved in three layers, later layers winning:
//! built-in defaults, an optional TOML file, then environment variables:
//! - `CLUBHOUSE_BIND`: listen address (default: 127.0.0.1:5000)
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `SECRET_KEY`: cookie signing secret
//! - `CLUBHOUSE_UPLOAD_ROOT`: base directory for uploaded images
//! - `CLUBHOUSE_ADMINS`: comma separated admin emails

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Secret used when nothing else is configured. Fine locally, never in production.
pub const DEFAULT_SECRET_KEY: &str = "local_secret_key";

/// Site owners allowed to publish members, events and articles.
pub const DEFAULT_ADMINS: &[&str] = &["nidalhasnaoui04@gmail.com", "khalidouisnaf@gmail.com"];

/// Longest session lifetime accepted, ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Runtime settings for the site
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    pub secret_key: String,
    /// Uploaded images live in `profiles/` and `images/` below this directory
    pub upload_root: PathBuf,
    pub admins: Vec<String>,
    /// Password given to members created by an admin
    pub default_member_password: String,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
    /// Mark cookies `Secure` (requires HTTPS in front of the server)
    pub secure_cookies: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_url: "postgres://localhost/clubhouse".to_string(),
            max_connections: 5,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            upload_root: PathBuf::from("static/uploads"),
            admins: DEFAULT_ADMINS.iter().map(|s| s.to_string()).collect(),
            default_member_password: "12345678".to_string(),
            session_ttl_hours: 24 * 31,
            max_upload_bytes: 16 * 1024 * 1024,
            secure_cookies: false,
        }
    }
}

impl SiteConfig {
    /// Load defaults, then the optional TOML file, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Override fields from environment variables.
    ///
    /// `lookup` is injected so tests never touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CLUBHOUSE_BIND") {
            self.bind_addr = parse_value("CLUBHOUSE_BIND", &v)?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = lookup("CLUBHOUSE_MAX_CONNECTIONS") {
            self.max_connections = parse_value("CLUBHOUSE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("SECRET_KEY") {
            self.secret_key = v;
        }
        if let Some(v) = lookup("CLUBHOUSE_UPLOAD_ROOT") {
            self.upload_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("CLUBHOUSE_ADMINS") {
            self.admins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(v) = lookup("CLUBHOUSE_DEFAULT_MEMBER_PASSWORD") {
            self.default_member_password = v;
        }
        if let Some(v) = lookup("CLUBHOUSE_SESSION_TTL_HOURS") {
            self.session_ttl_hours = parse_value("CLUBHOUSE_SESSION_TTL_HOURS", &v)?;
            check_session_ttl("CLUBHOUSE_SESSION_TTL_HOURS", self.session_ttl_hours)?;
        }
        if let Some(v) = lookup("CLUBHOUSE_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_value("CLUBHOUSE_MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = lookup("CLUBHOUSE_SECURE_COOKIES") {
            self.secure_cookies = parse_bool("CLUBHOUSE_SECURE_COOKIES", &v)?;
        }
        Ok(())
    }

    /// Range checks for values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_session_ttl("session_ttl_hours", self.session_ttl_hours)
    }

    /// Directory for profile pictures
    pub fn profile_upload_dir(&self) -> PathBuf {
        self.upload_root.join("profiles")
    }

    /// Directory for event and article images
    pub fn image_upload_dir(&self) -> PathBuf {
        self.upload_root.join("images")
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })
}

fn check_session_ttl(key: &'static str, hours: i64) -> Result<(), ConfigError> {
    if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            reason: format!("must be between 1 and {} hours", MAX_SESSION_TTL_HOURS),
        })
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}
