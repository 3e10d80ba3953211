use super::{Mailer, OutgoingMail};
use async_trait::async_trait;
use tracing::info;

/// Accepts every mail and writes it to the log. Used when no SMTP server is
/// configured, e.g. during local development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<bool> {
        info!(
            to = %mail.to,
            reply_to = %mail.reply_to,
            subject = %mail.subject,
            "contact mail (not sent, no SMTP configured)\n{}",
            mail.body
        );
        Ok(true)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
