//! Health check handlers

use crate::{health::HealthStatus, models::request::ApiResponse, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, warn};

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /health - Running health checks");

    let system_health = state.health_checker.check_all().await;

    let status_code = match system_health.overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => {
            warn!("Relay health is degraded");
            StatusCode::OK
        }
        HealthStatus::Unhealthy => {
            warn!("Relay health is unhealthy");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status_code, Json(ApiResponse::success(system_health)))
}
