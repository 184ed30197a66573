//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns an error, not panic.

pub mod account;
pub mod article;
pub mod email;
pub mod event;
pub mod form;
pub mod password;
pub mod title;
pub mod validation;

pub use account::{LoginForm, MemberDetails, NewUser, ProfileUpdate, RegisterForm};
pub use article::NewArticle;
pub use email::{EmailAddress, EmailError};
pub use event::{format_event_date, NewEvent};
pub use form::FormFields;
pub use password::{check_password_strength, WeakPassword};
pub use title::Title;
pub use validation::ValidationError;
