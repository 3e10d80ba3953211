//! Contact submission pipeline: validate, then try transports in order

use crate::config::AppConfig;
use crate::models::contact::{ContactForm, DeliveryMethod, SubmissionOutcome};
use crate::transport::{
    FallbackTransport, MailHandoff, RelayError, RelayTransport, SystemMailHandoff, Transport,
};
use crate::validation::{validate_contact, ContactValidationError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ContactValidationError),

    #[error("Unable to send message. Please try contacting directly at {recipient}")]
    Exhausted { recipient: String },
}

#[derive(Clone)]
pub struct ContactPipeline {
    recipient: String,
    transports: Vec<Arc<dyn Transport>>,
}

impl ContactPipeline {
    /// `recipient` is only used in the message shown when every transport
    /// has failed.
    pub fn new(recipient: impl Into<String>, transports: Vec<Arc<dyn Transport>>) -> Self {
        Self {
            recipient: recipient.into(),
            transports,
        }
    }

    /// Relay first (when enabled), then the system mail client.
    pub fn from_config(config: &AppConfig) -> Result<Self, RelayError> {
        Self::with_handoff(config, Arc::new(SystemMailHandoff))
    }

    pub fn with_handoff(
        config: &AppConfig,
        handoff: Arc<dyn MailHandoff>,
    ) -> Result<Self, RelayError> {
        let recipient = config.contact.recipient.clone();
        let mut transports: Vec<Arc<dyn Transport>> = Vec::with_capacity(2);

        if config.client.relay_enabled {
            transports.push(Arc::new(RelayTransport::new(
                config.client.relay_endpoint.clone(),
                config.client.relay_timeout(),
            )?));
        }
        transports.push(Arc::new(FallbackTransport::new(recipient.clone(), handoff)));

        Ok(Self::new(recipient, transports))
    }

    pub fn methods(&self) -> Vec<DeliveryMethod> {
        self.transports.iter().map(|transport| transport.method()).collect()
    }

    /// Validates the form and delivers it through the first transport that
    /// succeeds. Nothing is sent when validation fails.
    pub async fn submit(&self, form: &ContactForm) -> Result<SubmissionOutcome, PipelineError> {
        let message = validate_contact(form)?;

        for transport in &self.transports {
            let method = transport.method();
            match transport.attempt(&message).await {
                Ok(()) => {
                    info!(method = %method, "contact message delivered");
                    return Ok(SubmissionOutcome::delivered(method));
                }
                Err(err) => {
                    warn!(method = %method, error = %err, "transport failed, trying next");
                }
            }
        }

        Err(PipelineError::Exhausted {
            recipient: self.recipient.clone(),
        })
    }
}
