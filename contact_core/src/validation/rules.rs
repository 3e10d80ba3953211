//! Field-level validation rules

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

pub const MAX_EMAIL_LENGTH: usize = 254;

lazy_static! {
    // Permissive `local@domain.tld` shape, not RFC 5322.
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    static ref CONTROL_RUN_REGEX: Regex = Regex::new(r"[\p{Cc}]+").unwrap();
}

pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("Field is required"));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::new("Email cannot be empty"));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::new("Email is too long"));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::new("Invalid email format"));
    }

    Ok(())
}

pub fn validate_max_length(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new("Value is too long"));
    }

    Ok(())
}

/// Collapses every run of control characters (CR, LF, tabs, NUL, ...) into a
/// single space and trims the result. Used for values that end up in mail
/// headers.
pub fn collapse_control_chars(value: &str) -> String {
    CONTROL_RUN_REGEX.replace_all(value, " ").trim().to_string()
}
