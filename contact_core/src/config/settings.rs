use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::validation::validate_email;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub contact: ContactConfig,
    pub mailer: MailerConfig,
    pub client: ClientConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests still running after this long are answered with 408.
    pub request_timeout_seconds: u64,
}

/// Where relayed messages go and how they are labelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    pub recipient: String,
    pub from_name: String,
    /// Sender address. When unset, `noreply@<request host>` is used.
    pub from_address: Option<String>,
    pub subject_prefix: String,
    /// Append-only audit log of relayed messages. Empty disables it.
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// `smtp://` or `smtps://` URL. When unset, mail is only logged.
    pub smtp_url: Option<String>,
}

/// Settings for the submission pipeline that talks to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub relay_endpoint: String,
    pub relay_enabled: bool,
    pub relay_timeout_seconds: u64,
    pub success_display_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enable: bool,
    pub max_requests: usize,
    pub window_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            contact: ContactConfig::default(),
            mailer: MailerConfig::default(),
            client: ClientConfig::default(),
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            recipient: "contact@example.com".to_string(),
            from_name: "Portfolio Contact Form".to_string(),
            from_address: None,
            subject_prefix: "[Portfolio Contact]".to_string(),
            log_path: PathBuf::from("contact_log.txt"),
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self { smtp_url: None }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_endpoint: "http://127.0.0.1:3000/api/send-email".to_string(),
            relay_enabled: true,
            relay_timeout_seconds: 10,
            success_display_seconds: 5,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age_seconds: 3600,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enable: true,
            max_requests: 5,
            window_seconds: 60,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl ClientConfig {
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_seconds)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_secs(self.success_display_seconds)
    }
}

impl AppConfig {
    /// Layers defaults, an optional `config.toml` and `APP_*` environment
    /// variables (`APP_CONTACT__RECIPIENT`, `APP_SERVER__PORT`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if validate_email(&self.contact.recipient).is_err() {
            return Err(ConfigError::Message(format!(
                "Contact recipient '{}' is not a valid email address",
                self.contact.recipient
            )));
        }

        if let Some(from) = &self.contact.from_address {
            if validate_email(from).is_err() {
                return Err(ConfigError::Message(format!(
                    "Sender address '{}' is not a valid email address",
                    from
                )));
            }
        }

        if self.client.relay_enabled && self.client.relay_endpoint.is_empty() {
            return Err(ConfigError::Message(
                "Relay endpoint cannot be empty while the relay is enabled".to_string(),
            ));
        }

        if self.client.relay_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Relay timeout must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit.enable
            && (self.rate_limit.max_requests == 0 || self.rate_limit.window_seconds == 0)
        {
            return Err(ConfigError::Message(
                "Rate limit requests and window must be greater than 0".to_string(),
            ));
        }

        if self.contact.recipient == "contact@example.com" {
            tracing::warn!("Using the placeholder contact recipient - set APP_CONTACT__RECIPIENT");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
