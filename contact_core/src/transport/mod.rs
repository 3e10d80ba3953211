//! Delivery strategies for a validated contact message

pub mod fallback;
pub mod relay;

pub use fallback::{compose_body, mailto_link, FallbackTransport, MailHandoff, SystemMailHandoff};
pub use relay::RelayTransport;

use crate::models::contact::{ContactMessage, DeliveryMethod};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// One way of getting a message to the recipient. The pipeline tries its
/// transports in order and stops at the first one that succeeds.
#[async_trait]
pub trait Transport: Send + Sync {
    fn method(&self) -> DeliveryMethod;

    async fn attempt(&self, message: &ContactMessage) -> Result<(), TransportError>;
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Any failure of the relay round trip: network, HTTP status, or a reply
/// that is not the structured JSON the relay is supposed to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayError {
    status: Option<u16>,
    cause: String,
}

impl RelayError {
    pub fn new(status: Option<u16>, cause: impl Into<String>) -> Self {
        Self {
            status,
            cause: cause.into(),
        }
    }

    pub fn network(err: &reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            "Relay request timed out".to_string()
        } else if err.is_connect() {
            format!("Could not reach relay: {}", err)
        } else {
            format!("Relay request failed: {}", err)
        };
        Self::new(err.status().map(|status| status.as_u16()), cause)
    }

    pub fn not_json(status: u16, content_type: &str) -> Self {
        Self::new(
            Some(status),
            format!(
                "Server configuration error - relay did not return JSON (content type '{}')",
                content_type
            ),
        )
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {})", self.cause, status),
            None => f.write_str(&self.cause),
        }
    }
}

impl std::error::Error for RelayError {}
