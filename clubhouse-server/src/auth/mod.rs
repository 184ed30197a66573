//! Authentication and authorization
//!
//! - session: opaque token cookie resolved to the logged-in user
//! - password: one-way hashing of account passwords
//! - admin: allowlist gating the publishing pages

pub mod admin;
pub mod password;
pub mod session;

pub use admin::AdminList;
pub use password::{hash_password, verify_password, PasswordError};
pub use session::{end_session, start_session, SessionUser, Viewer, SESSION_COOKIE};
