//! Email address shape check and normalization
//!
//! Deliverability is not checked; this only rejects input that cannot be an
//! address and normalizes the domain to lowercase.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for a whole address
const MAX_EMAIL_LEN: usize = 254;

/// Local part: printable ASCII without whitespace, quotes or a second @
static LOCAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+$").expect("invalid local-part regex")
});

/// One DNS label: alphanumeric, hyphens inside only
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("invalid label regex")
});

/// Why an address was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("The email address is empty.")]
    Empty,

    #[error("The email address is too long.")]
    TooLong,

    #[error("The email address is not valid. It must have exactly one @-sign.")]
    AtSign,

    #[error("The part before the @-sign is not valid.")]
    LocalPart,

    #[error("The part after the @-sign is not valid. It should have a period.")]
    NoPeriod,

    #[error("The part after the @-sign is not a valid domain name.")]
    Domain,
}

/// Normalized email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalize an address.
    ///
    /// # Example
    /// ```
    /// use clubhouse_server::models::EmailAddress;
    ///
    /// let email = EmailAddress::parse(" Ada@Example.ORG ").unwrap();
    /// assert_eq!(email.as_str(), "Ada@example.org");
    /// assert!(EmailAddress::parse("ada.example.org").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > MAX_EMAIL_LEN {
            return Err(EmailError::TooLong);
        }

        let mut parts = trimmed.split('@');
        let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => (local, domain),
            _ => return Err(EmailError::AtSign),
        };

        if local.starts_with('.')
            || local.ends_with('.')
            || local.contains("..")
            || !LOCAL_RE.is_match(local)
        {
            return Err(EmailError::LocalPart);
        }

        if !domain.contains('.') {
            return Err(EmailError::NoPeriod);
        }
        if !domain.split('.').all(|label| LABEL_RE.is_match(label)) {
            return Err(EmailError::Domain);
        }

        Ok(Self(format!("{}@{}", local, domain.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        assert!(EmailAddress::parse("member@club.org").is_ok());
        assert!(EmailAddress::parse("first.last+tag@mail.uni.edu").is_ok());
        assert!(EmailAddress::parse("x@a-b.io").is_ok());
    }

    #[test]
    fn normalizes_domain_only() {
        let email = EmailAddress::parse("Mixed.Case@Gmail.COM").unwrap();
        assert_eq!(email.as_str(), "Mixed.Case@gmail.com");
    }

    #[test]
    fn rejects_missing_or_extra_at() {
        assert_eq!(EmailAddress::parse("nobody").unwrap_err(), EmailError::AtSign);
        assert_eq!(EmailAddress::parse("a@b@c.org").unwrap_err(), EmailError::AtSign);
    }

    #[test]
    fn rejects_bad_parts() {
        assert_eq!(EmailAddress::parse("").unwrap_err(), EmailError::Empty);
        assert_eq!(EmailAddress::parse("@club.org").unwrap_err(), EmailError::LocalPart);
        assert_eq!(EmailAddress::parse("a..b@club.org").unwrap_err(), EmailError::LocalPart);
        assert_eq!(EmailAddress::parse("me@localhost").unwrap_err(), EmailError::NoPeriod);
        assert_eq!(EmailAddress::parse("me@-club.org").unwrap_err(), EmailError::Domain);
        assert_eq!(EmailAddress::parse("me@club..org").unwrap_err(), EmailError::Domain);
    }

    #[test]
    fn error_text_is_user_facing() {
        let err = EmailAddress::parse("me@localhost").unwrap_err();
        assert_eq!(
            format!("Invalid email: {}", err),
            "Invalid email: The part after the @-sign is not valid. It should have a period."
        );
    }
}
