//! Submission state for a single contact form instance
//!
//! `Idle -> Submitting -> Success | Failed`. A success view reverts to
//! `Idle` on its own after the display timeout; a failure stays until the
//! user acknowledges it. Only one submission can be in flight at a time.

use crate::config::ClientConfig;
use crate::models::contact::{ContactForm, DeliveryMethod, SubmissionOutcome};
use crate::pipeline::{ContactPipeline, PipelineError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success { method: DeliveryMethod },
    Failed { reason: String },
}

#[derive(Debug)]
enum Phase {
    Idle,
    Submitting,
    Success { method: DeliveryMethod, until: Instant },
    Failed { reason: String },
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    draft: ContactForm,
}

impl Inner {
    fn expire(&mut self, now: Instant) {
        if let Phase::Success { until, .. } = self.phase {
            if now >= until {
                self.phase = Phase::Idle;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionPresenter {
    inner: Arc<Mutex<Inner>>,
    success_display: Duration,
}

impl Default for SubmissionPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_DISPLAY)
    }
}

impl SubmissionPresenter {
    pub fn new(success_display: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                phase: Phase::Idle,
                draft: ContactForm::default(),
            })),
            success_display,
        }
    }

    /// Uses the configured success display time.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.success_display())
    }

    pub fn success_display(&self) -> Duration {
        self.success_display
    }

    pub fn state(&self) -> SubmissionState {
        let mut inner = self.inner.lock();
        inner.expire(Instant::now());

        match &inner.phase {
            Phase::Idle => SubmissionState::Idle,
            Phase::Submitting => SubmissionState::Submitting,
            Phase::Success { method, .. } => SubmissionState::Success { method: *method },
            Phase::Failed { reason } => SubmissionState::Failed {
                reason: reason.clone(),
            },
        }
    }

    pub fn draft(&self) -> ContactForm {
        self.inner.lock().draft.clone()
    }

    pub fn edit_draft<F>(&self, edit: F)
    where
        F: FnOnce(&mut ContactForm),
    {
        edit(&mut self.inner.lock().draft);
    }

    /// Enters `Submitting`. Returns `false` and changes nothing when a
    /// submission is already in flight or the success view is showing.
    pub fn begin(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.expire(Instant::now());

        match inner.phase {
            Phase::Idle | Phase::Failed { .. } => {
                inner.phase = Phase::Submitting;
                true
            }
            Phase::Submitting | Phase::Success { .. } => false,
        }
    }

    /// `Submitting -> Success`. The draft is cleared.
    pub fn resolve(&self, outcome: &SubmissionOutcome) {
        let mut inner = self.inner.lock();
        if let Phase::Submitting = inner.phase {
            inner.phase = Phase::Success {
                method: outcome.method,
                until: Instant::now() + self.success_display,
            };
            inner.draft = ContactForm::default();
        }
    }

    /// `Submitting -> Failed`. The draft is kept so the user can retry.
    pub fn reject(&self, reason: impl Into<String>) {
        let mut inner = self.inner.lock();
        if let Phase::Submitting = inner.phase {
            inner.phase = Phase::Failed {
                reason: reason.into(),
            };
        }
    }

    /// "Try again": `Failed -> Idle`.
    pub fn acknowledge(&self) -> bool {
        let mut inner = self.inner.lock();
        if let Phase::Failed { .. } = inner.phase {
            inner.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Runs the draft through the pipeline. Returns `None` when the request
    /// was ignored because another submission is in flight.
    pub async fn submit(
        &self,
        pipeline: &ContactPipeline,
    ) -> Option<Result<SubmissionOutcome, PipelineError>> {
        if !self.begin() {
            debug!("submission ignored, form is busy");
            return None;
        }

        let form = self.draft();
        let result = pipeline.submit(&form).await;

        match &result {
            Ok(outcome) => self.resolve(outcome),
            Err(err) => self.reject(err.to_string()),
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contact::ContactMessage;
    use crate::transport::{Transport, TransportError};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct GatedTransport {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        fn method(&self) -> DeliveryMethod {
            DeliveryMethod::Relay
        }

        async fn attempt(&self, _message: &ContactMessage) -> Result<(), TransportError> {
            self.gate.notified().await;
            Ok(())
        }
    }

    struct InstantTransport;

    #[async_trait]
    impl Transport for InstantTransport {
        fn method(&self) -> DeliveryMethod {
            DeliveryMethod::Fallback
        }

        async fn attempt(&self, _message: &ContactMessage) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn pipeline_with(transport: Arc<dyn Transport>) -> ContactPipeline {
        ContactPipeline::new("owner@example.com", vec![transport])
    }

    fn fill(presenter: &SubmissionPresenter) {
        presenter.edit_draft(|draft| *draft = ContactForm::new("Jane", "jane@x.com", "Hello"));
    }

    #[test]
    fn test_manual_transitions() {
        let presenter = SubmissionPresenter::default();
        assert_eq!(presenter.state(), SubmissionState::Idle);

        assert!(presenter.begin());
        assert_eq!(presenter.state(), SubmissionState::Submitting);
        assert!(!presenter.begin());

        presenter.reject("Failed to send message");
        assert_eq!(
            presenter.state(),
            SubmissionState::Failed {
                reason: "Failed to send message".to_string()
            }
        );

        assert!(presenter.acknowledge());
        assert_eq!(presenter.state(), SubmissionState::Idle);
        assert!(!presenter.acknowledge());
    }

    #[test]
    fn test_resolve_only_from_submitting() {
        let presenter = SubmissionPresenter::default();
        presenter.resolve(&SubmissionOutcome::delivered(DeliveryMethod::Relay));
        assert_eq!(presenter.state(), SubmissionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_reverts_after_display_timeout() {
        let presenter = SubmissionPresenter::default();
        fill(&presenter);
        let pipeline = pipeline_with(Arc::new(InstantTransport));

        let outcome = presenter.submit(&pipeline).await.unwrap().unwrap();
        assert_eq!(outcome.method, DeliveryMethod::Fallback);
        assert_eq!(
            presenter.state(),
            SubmissionState::Success {
                method: DeliveryMethod::Fallback
            }
        );
        assert_eq!(presenter.draft(), ContactForm::default());
        assert!(!presenter.begin());

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert!(matches!(presenter.state(), SubmissionState::Success { .. }));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(presenter.state(), SubmissionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_display_time() {
        let config = ClientConfig {
            success_display_seconds: 2,
            ..ClientConfig::default()
        };
        let presenter = SubmissionPresenter::from_config(&config);
        assert_eq!(presenter.success_display(), Duration::from_secs(2));
        fill(&presenter);
        let pipeline = pipeline_with(Arc::new(InstantTransport));

        presenter.submit(&pipeline).await.unwrap().unwrap();
        assert!(matches!(presenter.state(), SubmissionState::Success { .. }));

        tokio::time::advance(Duration::from_millis(1_999)).await;
        assert!(matches!(presenter.state(), SubmissionState::Success { .. }));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(presenter.state(), SubmissionState::Idle);
        assert!(presenter.begin());
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_draft() {
        let presenter = SubmissionPresenter::default();
        presenter.edit_draft(|draft| *draft = ContactForm::new("Jane", "", "Hello"));
        let pipeline = pipeline_with(Arc::new(InstantTransport));

        let result = presenter.submit(&pipeline).await.unwrap();
        assert!(result.is_err());
        assert_eq!(
            presenter.state(),
            SubmissionState::Failed {
                reason: "Missing required field: email".to_string()
            }
        );
        assert_eq!(presenter.draft().name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_second_submit_ignored_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let pipeline = pipeline_with(Arc::new(GatedTransport { gate: gate.clone() }));
        let presenter = SubmissionPresenter::default();
        fill(&presenter);

        let first = {
            let presenter = presenter.clone();
            let pipeline = pipeline.clone();
            tokio::spawn(async move { presenter.submit(&pipeline).await })
        };

        while presenter.state() != SubmissionState::Submitting {
            tokio::task::yield_now().await;
        }

        assert!(presenter.submit(&pipeline).await.is_none());

        gate.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(first, Some(Ok(_))));
        assert_eq!(
            presenter.state(),
            SubmissionState::Success {
                method: DeliveryMethod::Relay
            }
        );
    }
}
