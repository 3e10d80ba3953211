pub mod settings;

pub use settings::{
    AppConfig, ClientConfig, ContactConfig, CorsConfig, MailerConfig, RateLimitConfig,
    ServerConfig,
};
