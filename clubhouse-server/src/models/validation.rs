//! Validation error types

use std::fmt;

/// Validation error for submitted form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} is required.", capitalize(field)),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trim a submitted field; blank input becomes `None` (stored as NULL).
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Trim a submitted field that must be present.
pub fn required_text(raw: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    optional_text(raw).ok_or(ValidationError::Empty { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 256,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 256 characters"
        );
        assert_eq!(
            ValidationError::Empty { field: "first name" }.to_string(),
            "First name is required."
        );
    }

    #[test]
    fn blank_text_is_none() {
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some(" Robotics ")), Some("Robotics".to_string()));
    }

    #[test]
    fn required_text_reports_field() {
        let err = required_text(Some(""), "title").unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "title" });
    }
}
