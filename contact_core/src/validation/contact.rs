//! Contact form validation

use super::rules::{collapse_control_chars, validate_email, validate_max_length, validate_required};
use crate::models::contact::{ContactForm, ContactMessage, DEFAULT_SUBJECT};
use std::fmt;
use thiserror::Error;

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_SUBJECT_LENGTH: usize = 200;
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Name,
    Email,
    Message,
    Subject,
}

impl ContactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Message => "message",
            ContactField::Subject => "subject",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    #[error("Missing required field: {0}")]
    Missing(ContactField),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Field too long: {0}")]
    TooLong(ContactField),
}

impl ContactValidationError {
    /// The field that failed.
    pub fn field(&self) -> ContactField {
        match self {
            ContactValidationError::Missing(field) | ContactValidationError::TooLong(field) => {
                *field
            }
            ContactValidationError::InvalidEmail => ContactField::Email,
        }
    }
}

/// Builds a [`ContactMessage`] from raw form values.
///
/// Fields are checked in the order name, email, message and the first
/// failure is returned. Required values are trimmed; name and subject also
/// lose any control characters because they are written into mail headers.
pub fn validate_contact(form: &ContactForm) -> Result<ContactMessage, ContactValidationError> {
    let name = collapse_control_chars(required(form.name.as_deref(), ContactField::Name)?);
    if name.is_empty() {
        return Err(ContactValidationError::Missing(ContactField::Name));
    }
    bounded(&name, MAX_NAME_LENGTH, ContactField::Name)?;

    let email = required(form.email.as_deref(), ContactField::Email)?;
    validate_email(email).map_err(|_| ContactValidationError::InvalidEmail)?;

    let message = required(form.message.as_deref(), ContactField::Message)?;
    bounded(message, MAX_MESSAGE_LENGTH, ContactField::Message)?;

    let subject = form
        .subject
        .as_deref()
        .map(collapse_control_chars)
        .filter(|subject| !subject.is_empty())
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    bounded(&subject, MAX_SUBJECT_LENGTH, ContactField::Subject)?;

    Ok(ContactMessage::new(
        name,
        email.to_string(),
        message.to_string(),
        subject,
    ))
}

fn required(value: Option<&str>, field: ContactField) -> Result<&str, ContactValidationError> {
    let value = value.unwrap_or_default();
    validate_required(value).map_err(|_| ContactValidationError::Missing(field))?;
    Ok(value.trim())
}

fn bounded(value: &str, max: usize, field: ContactField) -> Result<(), ContactValidationError> {
    validate_max_length(value, max).map_err(|_| ContactValidationError::TooLong(field))
}
