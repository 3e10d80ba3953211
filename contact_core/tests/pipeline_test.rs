mod common;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use common::{spawn_server, test_config, RecordingHandoff, RecordingMailer};
use contact_core::{
    create_app, AppState, ContactField, ContactForm, ContactPipeline, ContactValidationError,
    DeliveryMethod, PipelineError, RelayTransport, SubmissionOutcome, SubmissionPresenter,
    SubmissionState, Transport,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A relay stand-in that counts hits and answers every POST with `reply`.
async fn stub_relay<F, R>(reply: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(Value) -> R + Clone + Send + Sync + 'static,
    R: IntoResponse + Send + 'static,
{
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let router = Router::new().route(
        "/api/send-email",
        post(move |Json(body): Json<Value>| {
            let reply = reply.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                reply(body)
            }
        }),
    );

    let addr = spawn_server(router).await;
    (format!("http://{}/api/send-email", addr), hits)
}

fn pipeline_for(endpoint: &str, handoff: Arc<RecordingHandoff>) -> ContactPipeline {
    let mut config = test_config();
    config.client.relay_endpoint = endpoint.to_string();
    config.client.relay_timeout_seconds = 2;
    ContactPipeline::with_handoff(&config, handoff).unwrap()
}

fn jane() -> ContactForm {
    ContactForm::new("Jane", "jane@x.com", "Hello")
}

#[tokio::test]
async fn test_confirmed_relay_skips_fallback() {
    let (endpoint, hits) = stub_relay(|body: Value| {
        assert_eq!(body["name"], "Jane");
        assert_eq!(body["email"], "jane@x.com");
        assert_eq!(body["message"], "Hello");
        assert_eq!(body["subject"], "Contact Form Message");
        Json(json!({"success": true, "message": "Message sent successfully"}))
    })
    .await;
    let handoff = Arc::new(RecordingHandoff::default());

    let outcome = pipeline_for(&endpoint, handoff.clone())
        .submit(&jane())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SubmissionOutcome {
            success: true,
            method: DeliveryMethod::Relay
        }
    );
    assert_eq!(
        serde_json::to_value(outcome).unwrap(),
        json!({"success": true, "method": "relay"})
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(handoff.count(), 0);
}

#[tokio::test]
async fn test_html_reply_falls_back() {
    let (endpoint, hits) = stub_relay(|_| {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=UTF-8")],
            "<?php echo 'oops'; ?>",
        )
    })
    .await;
    let handoff = Arc::new(RecordingHandoff::default());

    let outcome = pipeline_for(&endpoint, handoff.clone())
        .submit(&jane())
        .await
        .unwrap();

    assert_eq!(outcome.method, DeliveryMethod::Fallback);
    assert!(outcome.success);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(handoff.count(), 1);
    assert!(handoff.links.lock()[0].starts_with("mailto:owner@example.com?subject="));
}

#[tokio::test]
async fn test_error_status_falls_back() {
    let (endpoint, _) = stub_relay(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to send message"})),
        )
    })
    .await;
    let handoff = Arc::new(RecordingHandoff::default());

    let outcome = pipeline_for(&endpoint, handoff.clone())
        .submit(&jane())
        .await
        .unwrap();

    assert_eq!(outcome.method, DeliveryMethod::Fallback);
    assert_eq!(handoff.count(), 1);
}

#[tokio::test]
async fn test_relay_error_carries_reason() {
    let (endpoint, _) = stub_relay(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid email address"})),
        )
    })
    .await;
    let relay = RelayTransport::new(endpoint, Duration::from_secs(2)).unwrap();
    let message = contact_core::validate_contact(&jane()).unwrap();

    let err = relay.attempt(&message).await.unwrap_err();

    let contact_core::TransportError::Relay(relay_error) = err;
    assert_eq!(relay_error.status(), Some(400));
    assert_eq!(relay_error.cause(), "Invalid email address");
}

#[tokio::test]
async fn test_unconfirmed_reply_falls_back() {
    let (endpoint, _) = stub_relay(|_| Json(json!({"message": "queued"}))).await;
    let handoff = Arc::new(RecordingHandoff::default());

    let outcome = pipeline_for(&endpoint, handoff.clone())
        .submit(&jane())
        .await
        .unwrap();

    assert_eq!(outcome.method, DeliveryMethod::Fallback);
}

#[tokio::test]
async fn test_unreachable_relay_falls_back() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handoff = Arc::new(RecordingHandoff::default());

    let outcome = pipeline_for(&format!("http://{}/api/send-email", addr), handoff.clone())
        .submit(&jane())
        .await
        .unwrap();

    assert_eq!(outcome.method, DeliveryMethod::Fallback);
    assert_eq!(handoff.count(), 1);
}

#[tokio::test]
async fn test_slow_relay_times_out() {
    let router = Router::new().route(
        "/api/send-email",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"success": true}))
        }),
    );
    let addr = spawn_server(router).await;
    let relay = RelayTransport::new(
        format!("http://{}/api/send-email", addr),
        Duration::from_millis(200),
    )
    .unwrap();
    let message = contact_core::validate_contact(&jane()).unwrap();

    let err = relay.attempt(&message).await.unwrap_err();

    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_invalid_form_never_reaches_network() {
    let (endpoint, hits) = stub_relay(|_| Json(json!({"success": true}))).await;
    let handoff = Arc::new(RecordingHandoff::default());

    let err = pipeline_for(&endpoint, handoff.clone())
        .submit(&ContactForm::new("", "jane@x.com", "Hello"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::Validation(ContactValidationError::Missing(ContactField::Name))
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(handoff.count(), 0);
}

#[tokio::test]
async fn test_end_to_end_through_relay_server() {
    let mailer = RecordingMailer::accepting();
    let state = AppState::new(test_config(), Arc::new(mailer.clone()));
    let addr = spawn_server(create_app(state)).await;
    let handoff = Arc::new(RecordingHandoff::default());
    let pipeline = pipeline_for(&format!("http://{}/api/send-email", addr), handoff.clone());

    let outcome = pipeline
        .submit(&jane().with_subject("Speaking engagement"))
        .await
        .unwrap();

    assert_eq!(outcome.method, DeliveryMethod::Relay);
    assert_eq!(handoff.count(), 0);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[Portfolio Contact] Speaking engagement");
    assert!(sent[0].body.contains("IP Address: 127.0.0.1"));
}

#[tokio::test]
async fn test_presenter_reports_fallback_success() {
    let mailer = RecordingMailer::refusing();
    let addr = spawn_server(create_app(AppState::new(test_config(), Arc::new(mailer)))).await;
    let handoff = Arc::new(RecordingHandoff::default());
    let pipeline = pipeline_for(&format!("http://{}/api/send-email", addr), handoff.clone());

    let presenter = SubmissionPresenter::from_config(&test_config().client);
    presenter.edit_draft(|draft| *draft = jane());

    let result = presenter.submit(&pipeline).await.unwrap().unwrap();

    assert_eq!(result.method, DeliveryMethod::Fallback);
    assert_eq!(
        presenter.state(),
        SubmissionState::Success {
            method: DeliveryMethod::Fallback
        }
    );
    assert_eq!(presenter.draft(), ContactForm::default());
    assert_eq!(handoff.count(), 1);
}
