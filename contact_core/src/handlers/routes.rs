//! Route table for the relay server

use super::{contact, health};
use crate::{middleware::rate_limit::rate_limit_middleware, models::request::ApiResponse, AppState};
use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

pub const SEND_EMAIL_PATH: &str = "/api/send-email";

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let mut send_email = post(contact::handle_send_email)
        .options(contact::handle_preflight)
        .fallback(contact::handle_method_not_allowed);

    if state.config.rate_limit.enable {
        send_email = send_email.route_layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ));
    }

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(health::handle_health))
        .route(SEND_EMAIL_PATH, send_email)
}

async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(
        ApiResponse::success(serde_json::json!({
            "app": state.app_name,
            "version": state.version,
            "mailer": state.mailer.name(),
            "endpoints": {
                "health": "/health",
                "send_email": SEND_EMAIL_PATH,
            }
        }))
        .with_message("Contact relay is running"),
    )
}
