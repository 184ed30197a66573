//! Password strength rules for self-registration

use std::fmt;

/// Minimum password length
const MIN_PASSWORD_LEN: usize = 8;

/// First rule a password failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakPassword {
    TooShort,
    NoUppercase,
    NoLowercase,
    NoDigit,
}

impl fmt::Display for WeakPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::TooShort => "Password must be at least 8 characters long.",
            Self::NoUppercase => "Missing uppercase letter.",
            Self::NoLowercase => "Missing lowercase letter.",
            Self::NoDigit => "Missing digit.",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for WeakPassword {}

/// Check the rules in order and report the first failure.
pub fn check_password_strength(password: &str) -> Result<(), WeakPassword> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WeakPassword::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(WeakPassword::NoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(WeakPassword::NoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(WeakPassword::NoDigit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes() {
        assert!(check_password_strength("Sunrise2024").is_ok());
    }

    #[test]
    fn rules_are_checked_in_order() {
        assert_eq!(check_password_strength("Ab1"), Err(WeakPassword::TooShort));
        assert_eq!(check_password_strength("lowercase1"), Err(WeakPassword::NoUppercase));
        assert_eq!(check_password_strength("UPPERCASE1"), Err(WeakPassword::NoLowercase));
        assert_eq!(check_password_strength("NoDigitsHere"), Err(WeakPassword::NoDigit));
    }

    #[test]
    fn messages() {
        assert_eq!(
            WeakPassword::TooShort.to_string(),
            "Password must be at least 8 characters long."
        );
        assert_eq!(WeakPassword::NoDigit.to_string(), "Missing digit.");
    }
}
