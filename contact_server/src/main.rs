//! Main entry point for the contact relay binary

use anyhow::Result;
use contact_core::{create_app, run_server, AppConfig, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());
    info!("Contact recipient: {}", config.contact.recipient);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let prune_interval = Duration::from_secs(config.rate_limit.window_seconds.max(1));
    let state = AppState::from_config(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialise relay: {}", e))?;

    info!("App: {} v{}", state.app_name, state.version);
    info!("Mailer: {}", state.mailer.name());
    match &state.contact_log {
        Some(log) => info!("Contact log: {}", log.path().display()),
        None => info!("Contact log disabled"),
    }

    if state.config.rate_limit.enable {
        let rate_limiter = state.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(prune_interval);
            loop {
                interval.tick().await;
                rate_limiter.prune();
            }
        });
    }

    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };

        format!(
            "{crate_name}={level},contact_core={level},tower_http=debug,axum=debug",
            crate_name = env!("CARGO_CRATE_NAME").replace('-', "_"),
            level = default_level
        )
        .into()
    });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
