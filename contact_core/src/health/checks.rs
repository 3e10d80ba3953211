//! Health checks for the relay's outbound dependencies

use crate::mailer::Mailer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: String,
    pub response_time_ms: u64,
    pub last_checked: chrono::DateTime<chrono::Utc>,
}

impl ComponentHealth {
    fn with_status(status: HealthStatus, message: String, response_time_ms: u64) -> Self {
        Self {
            status,
            message,
            response_time_ms,
            last_checked: chrono::Utc::now(),
        }
    }

    pub fn healthy(message: String, response_time_ms: u64) -> Self {
        Self::with_status(HealthStatus::Healthy, message, response_time_ms)
    }

    pub fn degraded(message: String, response_time_ms: u64) -> Self {
        Self::with_status(HealthStatus::Degraded, message, response_time_ms)
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self::with_status(HealthStatus::Unhealthy, message, response_time_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
    pub version: String,
}

impl SystemHealth {
    pub fn new(version: String, uptime_seconds: u64) -> Self {
        Self {
            overall_status: HealthStatus::Healthy,
            components: HashMap::new(),
            timestamp: chrono::Utc::now(),
            uptime_seconds,
            version,
        }
    }

    pub fn add_component(&mut self, name: String, health: ComponentHealth) {
        match health.status {
            HealthStatus::Unhealthy => {
                self.overall_status = HealthStatus::Unhealthy;
            }
            HealthStatus::Degraded => {
                if self.overall_status == HealthStatus::Healthy {
                    self.overall_status = HealthStatus::Degraded;
                }
            }
            HealthStatus::Healthy => {}
        }

        self.components.insert(name, health);
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status == HealthStatus::Healthy
    }
}

#[async_trait::async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> ComponentHealth;
    fn name(&self) -> &str;
}

/// An unreachable mail server only degrades the relay: clients still fall
/// back to their local mail client.
pub struct MailerHealthCheck {
    mailer: Arc<dyn Mailer>,
}

impl MailerHealthCheck {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait::async_trait]
impl HealthCheck for MailerHealthCheck {
    async fn check(&self) -> ComponentHealth {
        let start = Instant::now();
        let result = self.mailer.ping().await;
        let response_time = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => ComponentHealth::healthy(
                format!("{} mailer reachable", self.mailer.name()),
                response_time,
            ),
            Err(e) => {
                warn!("Mailer health check failed: {}", e);
                ComponentHealth::degraded(
                    format!("{} mailer unreachable: {}", self.mailer.name(), e),
                    response_time,
                )
            }
        }
    }

    fn name(&self) -> &str {
        "mailer"
    }
}

pub struct HealthChecker {
    checks: Vec<Box<dyn HealthCheck>>,
    version: String,
    started_at: Instant,
}

impl HealthChecker {
    pub fn new(version: String) -> Self {
        Self {
            checks: Vec::new(),
            version,
            started_at: Instant::now(),
        }
    }

    pub fn with_check(mut self, check: Box<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub async fn check_all(&self) -> SystemHealth {
        let mut system_health =
            SystemHealth::new(self.version.clone(), self.started_at.elapsed().as_secs());

        for check in &self.checks {
            let health = check.check().await;
            system_health.add_component(check.name().to_string(), health);
        }

        system_health
    }
}
