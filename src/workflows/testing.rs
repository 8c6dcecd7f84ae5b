//! In-memory collaborators shared by the workflow test suites.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::{
    AccessToken, ActionAcknowledgement, AdmissionsBackend, ApiError, FormPayload,
    SubmittedApplication,
};
use crate::workflows::token::Navigator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedCall {
    Apply(FormPayload),
    Accept(String),
    CompleteProfile(FormPayload),
}

/// Backend double that records every call and answers from canned results.
pub(crate) struct FakeBackend {
    calls: Mutex<Vec<RecordedCall>>,
    apply: Mutex<Result<SubmittedApplication, ApiError>>,
    accept: Mutex<Result<ActionAcknowledgement, ApiError>>,
    complete: Mutex<Result<ActionAcknowledgement, ApiError>>,
    hang: AtomicBool,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            apply: Mutex::new(Ok(SubmittedApplication {
                application_id: "APP-1".to_string(),
                submitted_at: None,
            })),
            accept: Mutex::new(Ok(ActionAcknowledgement {
                message: Some("Application accepted".to_string()),
            })),
            complete: Mutex::new(Ok(ActionAcknowledgement {
                message: Some("Profile completed".to_string()),
            })),
            hang: AtomicBool::new(false),
        }
    }
}

impl FakeBackend {
    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls mutex").clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls mutex").len()
    }

    pub(crate) fn respond_to_apply(&self, result: Result<SubmittedApplication, ApiError>) {
        *self.apply.lock().expect("apply mutex") = result;
    }

    pub(crate) fn respond_to_accept(&self, result: Result<ActionAcknowledgement, ApiError>) {
        *self.accept.lock().expect("accept mutex") = result;
    }

    pub(crate) fn respond_to_complete(&self, result: Result<ActionAcknowledgement, ApiError>) {
        *self.complete.lock().expect("complete mutex") = result;
    }

    /// Makes every later call wait forever, to exercise cancellation.
    pub(crate) fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    async fn maybe_hang(&self) {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().expect("calls mutex").push(call);
    }
}

#[async_trait]
impl AdmissionsBackend for FakeBackend {
    async fn submit_application(
        &self,
        payload: FormPayload,
    ) -> Result<SubmittedApplication, ApiError> {
        self.record(RecordedCall::Apply(payload));
        self.maybe_hang().await;
        self.apply.lock().expect("apply mutex").clone()
    }

    async fn accept_application(
        &self,
        token: &AccessToken,
    ) -> Result<ActionAcknowledgement, ApiError> {
        self.record(RecordedCall::Accept(token.expose().to_string()));
        self.maybe_hang().await;
        self.accept.lock().expect("accept mutex").clone()
    }

    async fn complete_profile(
        &self,
        payload: FormPayload,
    ) -> Result<ActionAcknowledgement, ApiError> {
        self.record(RecordedCall::CompleteProfile(payload));
        self.maybe_hang().await;
        self.complete.lock().expect("complete mutex").clone()
    }
}

/// Navigator that remembers every destination it was sent to.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingNavigator {
    visits: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub(crate) fn visits(&self) -> Vec<String> {
        self.visits.lock().expect("visits mutex").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: &str) {
        self.visits
            .lock()
            .expect("visits mutex")
            .push(destination.to_string());
    }
}
