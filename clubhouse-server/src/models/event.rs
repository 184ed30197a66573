//! Event input and date display formatting

use chrono::NaiveDate;

use super::validation::optional_text;
use super::{FormFields, Title, ValidationError};

/// Image used when an event is published without one
pub const DEFAULT_EVENT_IMAGE: &str = "default_event.jpg";

/// Render an ISO date (`2024-03-05`) as `March 05, 2024`.
///
/// Input that is not an ISO date is kept as typed.
pub fn format_event_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%B %d, %Y").to_string(),
        Err(_) => raw.to_owned(),
    }
}

/// Values for a new event row (image filled in by the upload step)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: Title,
    pub date_str: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl NewEvent {
    pub fn from_form(form: &impl FormFields) -> Result<Self, ValidationError> {
        Ok(Self {
            title: Title::new(form.text("title").unwrap_or_default())?,
            date_str: form
                .text("date_str")
                .filter(|s| !s.trim().is_empty())
                .map(format_event_date),
            category: optional_text(form.text("category")),
            description: optional_text(form.text("description")),
            content: optional_text(form.text("content")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn formats_iso_dates() {
        assert_eq!(format_event_date("2024-03-05"), "March 05, 2024");
        assert_eq!(format_event_date("2023-12-31"), "December 31, 2023");
    }

    #[test]
    fn keeps_free_text_dates() {
        assert_eq!(format_event_date("Next Friday"), "Next Friday");
        assert_eq!(format_event_date("2024-02-30"), "2024-02-30");
    }

    #[test]
    fn event_from_form() {
        let form: HashMap<String, String> = [
            ("title", "Robot Night"),
            ("date_str", "2025-01-10"),
            ("category", ""),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let event = NewEvent::from_form(&form).unwrap();
        assert_eq!(event.title.as_str(), "Robot Night");
        assert_eq!(event.date_str.as_deref(), Some("January 10, 2025"));
        assert_eq!(event.category, None);
    }

    #[test]
    fn event_requires_title() {
        let form = HashMap::new();
        assert!(matches!(
            NewEvent::from_form(&form),
            Err(ValidationError::Empty { field: "title" })
        ));
    }
}
