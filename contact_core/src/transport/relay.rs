//! Server-side relay transport

use super::{RelayError, Transport, TransportError};
use crate::models::contact::{ContactMessage, DeliveryMethod, RelayReply};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};

const BODY_SNIPPET_CHARS: usize = 200;

/// Posts the message to the relay endpoint once and waits for a JSON reply.
#[derive(Debug, Clone)]
pub struct RelayTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RelayError::network(&err))?;

        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, message: &ContactMessage) -> Result<(), RelayError> {
        debug!(endpoint = %self.endpoint, "posting contact message to relay");

        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await
            .map_err(|err| RelayError::network(&err))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !is_json(&content_type) {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
            warn!(
                status = status.as_u16(),
                content_type = %content_type,
                body = %snippet,
                "relay returned a non-JSON reply"
            );
            return Err(RelayError::not_json(status.as_u16(), &content_type));
        }

        let reply: RelayReply = response.json().await.map_err(|err| {
            RelayError::new(
                Some(status.as_u16()),
                format!("Relay reply was not valid JSON: {}", err),
            )
        })?;

        if !status.is_success() {
            let reason = reply
                .error
                .unwrap_or_else(|| "Failed to send message".to_string());
            return Err(RelayError::new(Some(status.as_u16()), reason));
        }

        if !reply.is_confirmed() {
            return Err(RelayError::new(
                Some(status.as_u16()),
                "Relay did not confirm delivery",
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl Transport for RelayTransport {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Relay
    }

    async fn attempt(&self, message: &ContactMessage) -> Result<(), TransportError> {
        self.post(message).await.map_err(TransportError::from)
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|mime| mime.type_() == mime::APPLICATION && mime.subtype() == mime::JSON)
        .unwrap_or(false)
}
