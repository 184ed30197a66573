//! Account forms: registration, login, profile edits, admin-created members

use serde::Deserialize;

use super::validation::{optional_text, required_text};
use super::{FormFields, ValidationError};

/// Image assigned to self-registered accounts
pub const REGISTERED_PROFILE_IMAGE: &str = "profile.jpg";

/// Image assigned to admin-created members without an upload
pub const DEFAULT_MEMBER_IMAGE: &str = "default_profile.jpg";

/// Role given to self-registered accounts
pub const DEFAULT_ROLE: &str = "Member";

/// POST /register body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Trim the free-text fields. Passwords are left untouched.
    pub fn trimmed(mut self) -> Self {
        self.first_name = self.first_name.trim().to_owned();
        self.last_name = self.last_name.trim().to_owned();
        self.phone_number = self.phone_number.trim().to_owned();
        self.email = self.email.trim().to_owned();
        self
    }
}

/// POST /login body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Row values for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub role: Option<String>,
    pub team: Option<String>,
    pub profile_image: String,
}

/// Editable profile fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn from_form(form: &impl FormFields) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: required_text(form.text("first_name"), "first name")?,
            last_name: optional_text(form.text("last_name")).unwrap_or_default(),
            phone_number: optional_text(form.text("phone_number")),
            bio: optional_text(form.text("bio")),
        })
    }
}

/// Member details submitted by an admin (password and image filled in later)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub team: Option<String>,
}

impl MemberDetails {
    pub fn from_form(form: &impl FormFields) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: required_text(form.text("first_name"), "first name")?,
            last_name: optional_text(form.text("last_name")).unwrap_or_default(),
            email: required_text(form.text("email"), "email")?,
            phone_number: optional_text(form.text("phone_number")),
            role: optional_text(form.text("role")),
            team: optional_text(form.text("team")),
        })
    }

    pub fn into_new_user(self, password_hash: String, profile_image: String) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            password_hash,
            role: self.role,
            team: self.team,
            profile_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn register_form_trims_but_keeps_passwords() {
        let f = RegisterForm {
            first_name: "  Ada ".into(),
            email: " ada@club.org ".into(),
            password: " Secret12 ".into(),
            ..Default::default()
        }
        .trimmed();
        assert_eq!(f.first_name, "Ada");
        assert_eq!(f.email, "ada@club.org");
        assert_eq!(f.password, " Secret12 ");
    }

    #[test]
    fn profile_update_requires_first_name() {
        let err = ProfileUpdate::from_form(&form(&[("last_name", "Lovelace")])).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "first name" });
    }

    #[test]
    fn profile_update_blank_bio_is_null() {
        let update = ProfileUpdate::from_form(&form(&[
            ("first_name", "Ada"),
            ("bio", "   "),
            ("phone_number", " 555 "),
        ]))
        .unwrap();
        assert_eq!(update.bio, None);
        assert_eq!(update.phone_number.as_deref(), Some("555"));
        assert_eq!(update.last_name, "");
    }

    #[test]
    fn member_details_keep_team_and_role() {
        let details = MemberDetails::from_form(&form(&[
            ("first_name", "Grace"),
            ("email", "grace@club.org"),
            ("role", "Lead"),
            ("team", "Media"),
        ]))
        .unwrap();
        let user = details.into_new_user("hash".into(), DEFAULT_MEMBER_IMAGE.into());
        assert_eq!(user.team.as_deref(), Some("Media"));
        assert_eq!(user.role.as_deref(), Some("Lead"));
        assert_eq!(user.profile_image, "default_profile.jpg");
    }
}
