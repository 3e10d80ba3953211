//! Contact form payloads and delivery results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject used when the sender leaves the subject blank.
pub const DEFAULT_SUBJECT: &str = "Contact Form Message";

/// Raw, untrusted field values as they arrive from a form or a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// A validated submission. Only the validator builds one, so holding a
/// `ContactMessage` means every required field is present and well formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    name: String,
    email: String,
    message: String,
    subject: String,
}

impl ContactMessage {
    pub(crate) fn new(name: String, email: String, message: String, subject: String) -> Self {
        Self {
            name,
            email,
            message,
            subject,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Relay,
    Fallback,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Relay => "relay",
            DeliveryMethod::Fallback => "fallback",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub method: DeliveryMethod,
}

impl SubmissionOutcome {
    pub fn delivered(method: DeliveryMethod) -> Self {
        Self {
            success: true,
            method,
        }
    }
}

/// Reply body of the relay endpoint. Success replies carry `success`,
/// failures carry `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayReply {
    pub fn is_confirmed(&self) -> bool {
        self.success == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_deserializes_with_missing_fields() {
        let form: ContactForm = serde_json::from_str(r#"{"name": "Jane"}"#).unwrap();
        assert_eq!(form.name.as_deref(), Some("Jane"));
        assert!(form.email.is_none());
        assert!(form.message.is_none());
        assert!(form.subject.is_none());
    }

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = SubmissionOutcome::delivered(DeliveryMethod::Fallback);
        let value = serde_json::to_value(outcome).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "method": "fallback"}));
    }

    #[test]
    fn test_relay_reply_confirmation() {
        let ok: RelayReply =
            serde_json::from_str(r#"{"success": true, "message": "sent"}"#).unwrap();
        assert!(ok.is_confirmed());

        let failed: RelayReply =
            serde_json::from_str(r#"{"error": "Invalid email address"}"#).unwrap();
        assert!(!failed.is_confirmed());
        assert_eq!(failed.error.as_deref(), Some("Invalid email address"));
    }
}
