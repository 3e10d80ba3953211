#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use contact_core::{AppConfig, MailHandoff, Mailer, OutgoingMail};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
    accept: bool,
}

impl RecordingMailer {
    pub fn accepting() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            accept: true,
        }
    }

    pub fn refusing() -> Self {
        Self {
            accept: false,
            ..Self::accepting()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<bool> {
        self.sent.lock().push(mail);
        Ok(self.accept)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[derive(Default)]
pub struct RecordingHandoff {
    pub links: Mutex<Vec<String>>,
}

impl MailHandoff for RecordingHandoff {
    fn open(&self, link: &str) -> std::io::Result<()> {
        self.links.lock().push(link.to_string());
        Ok(())
    }
}

impl RecordingHandoff {
    pub fn count(&self) -> usize {
        self.links.lock().len()
    }
}

/// Defaults with the contact log switched off so tests never touch the
/// working directory.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.contact.recipient = "owner@example.com".to_string();
    config.contact.log_path = PathBuf::new();
    config
}

/// Serves `router` on an ephemeral local port and returns its address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    addr
}
