//! Admin allowlist
//!
//! Only listed emails may add members, events and articles.

use std::collections::HashSet;

use super::SessionUser;
use crate::http::error::Bounce;
use crate::http::flash::Flash;

/// Lowercased set of admin emails
#[derive(Debug, Clone, Default)]
pub struct AdminList {
    emails: HashSet<String>,
}

impl AdminList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    /// Allow admins through; everyone else is sent to `denied_to`.
    pub fn require(&self, user: &SessionUser, denied_to: &str) -> Result<(), Bounce> {
        if self.is_admin(&user.email) {
            return Ok(());
        }
        tracing::warn!(user_id = user.user_id, email = %user.email, "Admin page refused");
        Err(Bounce::to(denied_to).with_flash(Flash::danger("Access Denied!")))
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
