//! Contact relay endpoint

use crate::{
    error::{AppError, Result},
    mailer::{OutgoingMail, SubmissionMeta},
    middleware::rate_limit::forwarded_for,
    models::contact::{ContactForm, RelayReply},
    validation::validate_contact,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::net::SocketAddr;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Validates the posted form, relays it to the configured recipient and
/// records it in the contact log.
pub async fn handle_send_email(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<RelayReply>> {
    let Json(form) = payload.map_err(|rejection| {
        warn!("Rejected contact payload: {}", rejection.body_text());
        AppError::BadRequest("Invalid JSON data".to_string())
    })?;

    let message = validate_contact(&form).inspect_err(|err| {
        info!(field = %err.field(), "contact submission failed validation");
    })?;

    let meta = SubmissionMeta {
        host: headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| state.config.server.host.clone()),
        client_ip: connect_info
            .map(|ConnectInfo(addr)| addr.ip())
            .or_else(|| forwarded_for(&headers)),
        received_at: chrono::Utc::now(),
    };

    let submission_id = Uuid::new_v4();
    info!(
        %submission_id,
        subject = %message.subject(),
        mailer = state.mailer.name(),
        "POST /api/send-email - relaying contact message"
    );

    let mail = OutgoingMail::from_contact(&message, &state.config.contact, &meta);
    match state.mailer.send(mail).await {
        Ok(true) => {}
        Ok(false) => {
            error!(%submission_id, "Contact message was not accepted by the mail server");
            return Err(AppError::Delivery {
                recipient: state.config.contact.recipient.clone(),
            });
        }
        Err(e) => {
            error!(%submission_id, "Mail transport error: {:#}", e);
            return Err(AppError::Delivery {
                recipient: state.config.contact.recipient.clone(),
            });
        }
    }

    if let Some(contact_log) = &state.contact_log {
        if let Err(e) = contact_log.append(&message, meta.received_at).await {
            warn!(
                %submission_id,
                path = %contact_log.path().display(),
                "Failed to append to contact log: {}",
                e
            );
        }
    }

    Ok(Json(RelayReply {
        success: Some(true),
        message: Some("Message sent successfully".to_string()),
        error: None,
    }))
}

pub async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
