//! Access to submitted form text fields

use std::collections::HashMap;

/// Source of submitted text fields (urlencoded or multipart)
pub trait FormFields {
    fn text(&self, name: &str) -> Option<&str>;
}

impl FormFields for HashMap<String, String> {
    fn text(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}
