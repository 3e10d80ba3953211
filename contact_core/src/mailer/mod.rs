//! Outgoing mail for relayed contact messages

pub mod log;
pub mod smtp;

pub use log::LogMailer;
pub use smtp::SmtpMailer;

use crate::config::{ContactConfig, MailerConfig};
use crate::models::contact::ContactMessage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Returns `Ok(false)` when the server answered but refused the mail.
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<bool>;

    async fn ping(&self) -> anyhow::Result<()>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailParty {
    pub name: Option<String>,
    pub address: String,
}

impl MailParty {
    pub fn new(name: Option<String>, address: impl Into<String>) -> Self {
        Self {
            name,
            address: address.into(),
        }
    }
}

impl fmt::Display for MailParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// Request details stamped into the relayed mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMeta {
    pub host: String,
    pub client_ip: Option<IpAddr>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: MailParty,
    pub to: MailParty,
    pub reply_to: MailParty,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn from_contact(
        message: &ContactMessage,
        config: &ContactConfig,
        meta: &SubmissionMeta,
    ) -> Self {
        let from_address = config
            .from_address
            .clone()
            .unwrap_or_else(|| format!("noreply@{}", sender_domain(&meta.host)));

        let client_ip = meta
            .client_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let body = format!(
            "New message from your portfolio contact form:\n\n\
             Name: {name}\n\
             Email: {email}\n\
             Subject: {subject}\n\n\
             Message:\n{message}\n\n\
             ---\n\
             Sent from: {host}\n\
             IP Address: {ip}\n\
             Timestamp: {timestamp}\n",
            name = message.name(),
            email = message.email(),
            subject = message.subject(),
            message = message.message(),
            host = meta.host,
            ip = client_ip,
            timestamp = meta.received_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );

        Self {
            from: MailParty::new(Some(config.from_name.clone()), from_address),
            to: MailParty::new(None, config.recipient.clone()),
            reply_to: MailParty::new(Some(message.name().to_string()), message.email()),
            subject: format!("{} {}", config.subject_prefix, message.subject()),
            body,
        }
    }
}

/// Host header without port, used to derive the default sender domain.
fn sender_domain(host: &str) -> &str {
    host.rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map(|(domain, _)| domain)
        .unwrap_or(host)
}

pub fn mailer_from_config(config: &MailerConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.smtp_url {
        Some(url) if !url.is_empty() => {
            info!("Relaying contact mail over SMTP");
            Ok(Arc::new(SmtpMailer::new(url)?))
        }
        _ => {
            info!("No SMTP URL configured, contact mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
