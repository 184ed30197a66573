//! Article input

use super::validation::optional_text;
use super::{FormFields, Title, ValidationError};

/// Image used when an article is published without one
pub const DEFAULT_ARTICLE_IMAGE: &str = "default_article.jpg";

/// Values for a new article row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: Title,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
}

impl NewArticle {
    pub fn from_form(form: &impl FormFields) -> Result<Self, ValidationError> {
        Ok(Self {
            title: Title::new(form.text("title").unwrap_or_default())?,
            author: optional_text(form.text("author")),
            subject: optional_text(form.text("subject")),
            summary: optional_text(form.text("summary")),
            content: optional_text(form.text("content")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn article_from_form() {
        let form: HashMap<String, String> = [
            ("title", " Why we build robots "),
            ("author", "Nidal"),
            ("summary", ""),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let article = NewArticle::from_form(&form).unwrap();
        assert_eq!(article.title.as_str(), "Why we build robots");
        assert_eq!(article.author.as_deref(), Some("Nidal"));
        assert_eq!(article.summary, None);
    }
}
