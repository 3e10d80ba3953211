//! Local mail-client hand-off

use super::{Transport, TransportError};
use crate::models::contact::{ContactMessage, DeliveryMethod};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{info, warn};

/// Characters `encodeURIComponent` leaves alone, so mail clients see the same
/// link a browser would produce.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const FALLBACK_FOOTER: &str = "This message was sent from your portfolio contact form.";

/// Something that can open a `mailto:` link in the user's mail client.
pub trait MailHandoff: Send + Sync {
    fn open(&self, link: &str) -> io::Result<()>;
}

/// Opens links with the platform opener and does not wait for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMailHandoff;

impl MailHandoff for SystemMailHandoff {
    fn open(&self, link: &str) -> io::Result<()> {
        opener_command(link)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
    }
}

#[cfg(target_os = "macos")]
fn opener_command(link: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(link);
    command
}

#[cfg(windows)]
fn opener_command(link: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(link);
    command
}

#[cfg(all(unix, not(target_os = "macos")))]
fn opener_command(link: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(link);
    command
}

pub fn compose_body(message: &ContactMessage) -> String {
    format!(
        "From: {} ({})\nSubject: {}\n\nMessage:\n{}\n\n---\n{}",
        message.name(),
        message.email(),
        message.subject(),
        message.message(),
        FALLBACK_FOOTER,
    )
}

pub fn mailto_link(recipient: &str, message: &ContactMessage) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        utf8_percent_encode(message.subject(), URI_COMPONENT),
        utf8_percent_encode(&compose_body(message), URI_COMPONENT),
    )
}

/// Last-resort transport. The hand-off is fire-and-forget, so once invoked
/// this transport always reports success.
#[derive(Clone)]
pub struct FallbackTransport {
    recipient: String,
    handoff: Arc<dyn MailHandoff>,
}

impl FallbackTransport {
    pub fn new(recipient: impl Into<String>, handoff: Arc<dyn MailHandoff>) -> Self {
        Self {
            recipient: recipient.into(),
            handoff,
        }
    }

    pub fn system(recipient: impl Into<String>) -> Self {
        Self::new(recipient, Arc::new(SystemMailHandoff))
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }
}

#[async_trait]
impl Transport for FallbackTransport {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Fallback
    }

    async fn attempt(&self, message: &ContactMessage) -> Result<(), TransportError> {
        let link = mailto_link(&self.recipient, message);

        match self.handoff.open(&link) {
            Ok(()) => info!(recipient = %self.recipient, "handed message to local mail client"),
            Err(err) => warn!(error = %err, "mail client hand-off could not be started"),
        }

        Ok(())
    }
}
