//! Contact form delivery: the client-side submission pipeline and the relay
//! server it posts to.

pub mod audit;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod presenter;
pub mod transport;
pub mod validation;

pub use audit::ContactLog;
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use health::{HealthChecker, HealthStatus, MailerHealthCheck, SystemHealth};
pub use mailer::{mailer_from_config, LogMailer, Mailer, OutgoingMail, SmtpMailer};
pub use middleware::rate_limit::RateLimiter;
pub use models::contact::{
    ContactForm, ContactMessage, DeliveryMethod, RelayReply, SubmissionOutcome,
};
pub use pipeline::{ContactPipeline, PipelineError};
pub use presenter::{SubmissionPresenter, SubmissionState};
pub use transport::{
    FallbackTransport, MailHandoff, RelayError, RelayTransport, SystemMailHandoff, Transport,
    TransportError,
};
pub use validation::{validate_contact, ContactField, ContactValidationError};

use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub contact_log: Option<Arc<ContactLog>>,
    pub rate_limiter: RateLimiter,
    pub health_checker: Arc<HealthChecker>,
}

impl AppState {
    pub fn new(config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let version = env!("CARGO_PKG_VERSION").to_string();
        let health_checker = HealthChecker::new(version.clone())
            .with_check(Box::new(MailerHealthCheck::new(mailer.clone())));

        Self {
            app_name: "Contact Relay".to_string(),
            version,
            contact_log: ContactLog::from_path(&config.contact.log_path).map(Arc::new),
            rate_limiter: RateLimiter::new(&config.rate_limit),
            health_checker: Arc::new(health_checker),
            mailer,
            config: Arc::new(config),
        }
    }

    /// Picks the mailer from configuration: SMTP when a URL is set,
    /// otherwise log-only.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let mailer = mailer_from_config(&config.mailer)?;
        Ok(Self::new(config, mailer))
    }

    pub fn with_contact_log(mut self, contact_log: Option<ContactLog>) -> Self {
        self.contact_log = contact_log.map(Arc::new);
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .merge(create_routes(&state))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(middleware::cors::cors_layer_from_config(&config.cors))
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting contact relay on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
