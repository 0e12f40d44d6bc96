//! Domain error types

use thiserror::Error;

/// Required consultation fields left empty when a recording is stopped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("All required fields must be filled in (missing: {})", .fields.join(", "))]
pub struct MissingFields {
    pub fields: Vec<&'static str>,
}

/// Error when user-entered form data is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid email address: \"{0}\"")]
    InvalidEmail(String),

    #[error("Invalid birthdate: \"{0}\". Expected format: YYYY-MM-DD")]
    InvalidBirthdate(String),

    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Invalid audio extension: \"{0}\". Use letters and digits only, e.g. flac")]
    InvalidExtension(String),

    #[error("Audio extension \"{0}\" is reserved for unfinished recordings")]
    ReservedExtension(String),

    #[error("Invalid sample rate: {0} Hz. Expected 8000 to 192000")]
    InvalidSampleRate(u32),

    #[error("Unknown field: \"{0}\". Valid fields: name, surname, day, month, year, weight, sex, history")]
    UnknownField(String),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_field() {
        let err = MissingFields {
            fields: vec!["name", "sex"],
        };
        assert_eq!(
            err.to_string(),
            "All required fields must be filled in (missing: name, sex)"
        );
    }

    #[test]
    fn input_error_mentions_format() {
        let err = InputError::InvalidBirthdate("01/02/1990".to_string());
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }
}
