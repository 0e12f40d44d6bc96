//! Practitioner account forms

use serde::Serialize;

use crate::domain::error::InputError;

/// Login form
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if !is_valid_email(&self.email) {
            return Err(InputError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// Signup form
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub specialty: String,
    pub password: String,
    /// `YYYY-MM-DD`
    pub birthdate: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), InputError> {
        if !is_valid_email(&self.email) {
            return Err(InputError::InvalidEmail(self.email.clone()));
        }
        if !is_valid_birthdate(&self.birthdate) {
            return Err(InputError::InvalidBirthdate(self.birthdate.clone()));
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
/// The domain needs a dot with at least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Exactly `YYYY-MM-DD` with ASCII digits; the calendar is not checked
pub fn is_valid_birthdate(birthdate: &str) -> bool {
    let bytes = birthdate.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
