//! Title validation for events and articles

use super::ValidationError;

/// Maximum length for titles
const MAX_TITLE_LEN: usize = 256;

/// Validated event or article title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Create a new title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 256 characters
    ///
    /// # Example
    /// ```
    /// use clubhouse_server::models::Title;
    ///
    /// assert!(Title::new("Spring Hackathon").is_ok());
    /// assert!(Title::new("").is_err());
    /// assert!(Title::new("   ").is_err());  // whitespace only
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        let title = Title::new("  Workshop  ").unwrap();
        assert_eq!(title.as_str(), "Workshop");
    }

    #[test]
    fn max_length() {
        assert!(Title::new(&"a".repeat(256)).is_ok());
        let err = Title::new(&"a".repeat(257)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 256, .. }));
    }
}
