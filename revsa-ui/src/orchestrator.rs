//! Analysis request state machine
//!
//! ```text
//! Idle ──submit──▶ Pending ──ok + valid──▶ Success(response)
//!                     │
//!                     └──transport / timeout / invalid / cancel──▶ Failed
//! Success | Failed ──submit──▶ Pending
//! ```
//!
//! One [`Orchestrator`] serves one user session and allows a single
//! outstanding request: a `submit` while `Pending` is refused with
//! [`SubmitError::Busy`]. Entering `Pending` replaces any previous result or
//! error, so the two are never visible together.
//!
//! Every failure shows the same [`GENERIC_ERROR_MESSAGE`] (cancellation aside);
//! the cause is logged and the [`FailureKind`] kept for programmatic checks.

use revsa_common::{
    group, validate, AnalysisRequest, AnalysisResponse, Classifier, ClassifierError, GroupedReviews,
    ValidationMode,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// User-facing message for any failed analysis
pub const GENERIC_ERROR_MESSAGE: &str =
    "Error fetching or analyzing reviews. Please check the URL or try again later.";

/// User-facing message for an analysis cancelled by the user
pub const CANCELLED_MESSAGE: &str = "Analysis cancelled.";

/// Why an analysis failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Network error or non-success status from the classifier
    Transport,
    /// No classifier response within the timeout
    Timeout,
    /// Classifier payload had the wrong shape
    Validation,
    /// Cancelled while pending
    Cancelled,
}

/// Lifecycle state of the current analysis
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Pending,
    Success(Arc<AnalysisResponse>),
    Failed { message: String, kind: FailureKind },
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    pub fn response(&self) -> Option<&AnalysisResponse> {
        match self {
            RequestState::Success(response) => Some(response),
            _ => None,
        }
    }

    /// Grouped reviews of a successful analysis, recomputed on each call
    pub fn grouped(&self) -> Option<GroupedReviews> {
        self.response().map(group)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RequestState::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    fn failed(kind: FailureKind) -> Self {
        let message = match kind {
            FailureKind::Cancelled => CANCELLED_MESSAGE,
            _ => GENERIC_ERROR_MESSAGE,
        };
        RequestState::Failed {
            message: message.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("an analysis is already in progress")]
    Busy,
}

/// Owns the lifecycle of one session's analysis requests
pub struct Orchestrator {
    classifier: Arc<dyn Classifier>,
    validation: ValidationMode,
    timeout: Duration,
    state: watch::Sender<RequestState>,
    /// Token of the in-flight request, if any
    in_flight: Mutex<Option<CancellationToken>>,
}

impl Orchestrator {
    pub fn new(classifier: Arc<dyn Classifier>, validation: ValidationMode, timeout: Duration) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            classifier,
            validation,
            timeout,
            state,
            in_flight: Mutex::new(None),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Run one analysis to completion and return the resulting state
    ///
    /// The state is `Pending` from the moment this is called until the
    /// classifier call resolves. If the returned future is dropped early the
    /// request counts as cancelled.
    pub async fn submit(&self, request: AnalysisRequest) -> Result<RequestState, SubmitError> {
        let token = self.begin()?;
        let mut guard = PendingGuard { orchestrator: self, armed: true };

        info!(url = %request.url(), "Analysis started");

        let next = tokio::select! {
            _ = token.cancelled() => {
                info!(url = %request.url(), "Analysis cancelled");
                RequestState::failed(FailureKind::Cancelled)
            }
            outcome = self.run(&request) => match outcome {
                Ok(response) => {
                    info!(
                        url = %request.url(),
                        total_reviews = response.total_reviews,
                        processing_time = response.processing_time_seconds,
                        "Analysis succeeded"
                    );
                    RequestState::Success(Arc::new(response))
                }
                Err(kind) => RequestState::failed(kind),
            }
        };

        guard.armed = false;
        self.finish(next.clone());
        Ok(next)
    }

    /// Cancel the in-flight request; returns false when nothing is pending
    pub fn cancel(&self) -> bool {
        match self.lock_in_flight().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Enter `Pending` unless a request is already outstanding
    fn begin(&self) -> Result<CancellationToken, SubmitError> {
        let mut in_flight = self.lock_in_flight();
        let entered = self.state.send_if_modified(|state| {
            if state.is_pending() {
                false
            } else {
                *state = RequestState::Pending;
                true
            }
        });
        if !entered {
            return Err(SubmitError::Busy);
        }

        let token = CancellationToken::new();
        *in_flight = Some(token.clone());
        Ok(token)
    }

    fn finish(&self, next: RequestState) {
        let mut in_flight = self.lock_in_flight();
        *in_flight = None;
        self.state.send_replace(next);
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, FailureKind> {
        let raw = match tokio::time::timeout(self.timeout, self.classifier.classify(request)).await {
            Err(_) => {
                warn!(url = %request.url(), timeout = ?self.timeout, kind = ?FailureKind::Timeout, "Classifier timed out");
                return Err(FailureKind::Timeout);
            }
            Ok(Err(e)) => {
                let kind = match e {
                    ClassifierError::Timeout(_) => FailureKind::Timeout,
                    _ => FailureKind::Transport,
                };
                warn!(url = %request.url(), error = %e, kind = ?kind, "Classifier call failed");
                return Err(kind);
            }
            Ok(Ok(raw)) => raw,
        };

        validate(&raw, self.validation).map_err(|e| {
            warn!(
                url = %request.url(),
                error = %e,
                detail = %e.detail(),
                kind = ?FailureKind::Validation,
                "Classifier response rejected"
            );
            FailureKind::Validation
        })
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Moves a dropped `submit` out of `Pending`
struct PendingGuard<'a> {
    orchestrator: &'a Orchestrator,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.orchestrator.finish(RequestState::failed(FailureKind::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use revsa_common::Prediction;
    use serde_json::{json, Value};

    struct FixedClassifier(Value);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _request: &AnalysisRequest) -> Result<Value, ClassifierError> {
            Ok(self.0.clone())
        }

        async fn predict_text(&self, _text: &str) -> Result<Prediction, ClassifierError> {
            unreachable!()
        }
    }

    fn orchestrator(payload: Value) -> Orchestrator {
        Orchestrator::new(
            Arc::new(FixedClassifier(payload)),
            ValidationMode::Strict,
            Duration::from_secs(5),
        )
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("https://shop.example/item/1").unwrap()
    }

    #[test]
    fn test_starts_idle() {
        let orch = orchestrator(json!({}));
        assert_eq!(orch.state(), RequestState::Idle);
        assert!(!orch.cancel());
    }

    #[tokio::test]
    async fn test_success_and_validation_failure_states() {
        let ok = json!({
            "sentiment_counts": { "Positive": 1, "Negative": 0, "Neutral": 0 },
            "reviews": [{ "review": "love it", "sentiment": "Positive" }],
            "total_reviews": 1,
            "processing_time": 0.2
        });
        let orch = orchestrator(ok);
        let state = orch.submit(request()).await.unwrap();
        assert!(state.response().is_some());
        assert!(state.error_message().is_none());

        let bad = orchestrator(json!({ "sentiment_counts": {} }));
        let state = bad.submit(request()).await.unwrap();
        assert!(state.response().is_none());
        assert_eq!(state.error_message(), Some(GENERIC_ERROR_MESSAGE));
        assert_eq!(state.failure_kind(), Some(FailureKind::Validation));
    }

    #[tokio::test]
    async fn test_unpolled_submit_stays_idle() {
        let orch = orchestrator(json!({}));
        drop(orch.submit(request()));
        assert_eq!(orch.state(), RequestState::Idle);
    }
}
