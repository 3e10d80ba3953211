//! Input validation for contact submissions

pub mod contact;
pub mod rules;

pub use contact::{validate_contact, ContactField, ContactValidationError};
pub use rules::{collapse_control_chars, validate_email, validate_max_length, validate_required};
