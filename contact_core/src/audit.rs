//! Append-only log of relayed contact messages

use crate::models::contact::ContactMessage;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct ContactLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ContactLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `None` when the configured path is empty, which disables the log.
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(Self::new(path))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(
        &self,
        message: &ContactMessage,
        at: DateTime<Utc>,
    ) -> std::io::Result<()> {
        let line = format_entry(message, at);

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

fn format_entry(message: &ContactMessage, at: DateTime<Utc>) -> String {
    format!(
        "{} - Message from: {} ({}) - Subject: {}\n",
        at.format("%Y-%m-%d %H:%M:%S"),
        message.name(),
        message.email(),
        message.subject(),
    )
}
