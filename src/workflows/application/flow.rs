use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::draft::{application_steps, ApplicationDraft, ApplicationResult, ApplicationValidationError};
use crate::api::{AdmissionsBackend, ApiError, FormPayload, Operation, SubmittedApplication, UploadedFile};
use crate::catalog::CourseCatalog;
use crate::config::UploadLimits;
use crate::workflows::attachments::{AcceptPolicy, AttachmentError, DocumentSlot, DragEvent};
use crate::workflows::wizard::{StepView, StepWizard};

/// Lifecycle of one application draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    Editing,
    Submitting,
    Submitted(ApplicationResult),
    Failed { message: String },
}

impl SubmissionState {
    pub const fn label(&self) -> &'static str {
        match self {
            SubmissionState::Editing => "editing",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Submitted(_) => "submitted",
            SubmissionState::Failed { .. } => "failed",
        }
    }
}

/// Three-step application wizard plus its single remote submission.
#[derive(Debug)]
pub struct ApplicationSubmissionFlow {
    catalog: Arc<CourseCatalog>,
    policy: AcceptPolicy,
    wizard: StepWizard<ApplicationDraft>,
    draft: ApplicationDraft,
    state: SubmissionState,
    inline_error: Option<ApplicationValidationError>,
    cancel: CancellationToken,
    torn_down: bool,
}

impl ApplicationSubmissionFlow {
    pub fn new(catalog: Arc<CourseCatalog>, limits: &UploadLimits) -> Self {
        let policy = AcceptPolicy::documents(Some(limits.document_max_bytes));
        Self {
            catalog,
            policy,
            wizard: StepWizard::new(application_steps()),
            draft: ApplicationDraft::new(policy),
            state: SubmissionState::Editing,
            inline_error: None,
            cancel: CancellationToken::new(),
            torn_down: false,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn inline_error(&self) -> Option<&ApplicationValidationError> {
        self.inline_error.as_ref()
    }

    pub fn result(&self) -> Option<&ApplicationResult> {
        match &self.state {
            SubmissionState::Submitted(result) => Some(result),
            _ => None,
        }
    }

    pub fn current_step(&self) -> usize {
        self.wizard.current_step()
    }

    pub fn total_steps(&self) -> usize {
        self.wizard.total_steps()
    }

    pub fn steps(&self) -> Vec<StepView> {
        self.wizard.steps()
    }

    pub fn can_advance(&self) -> bool {
        self.is_editable() && self.wizard.can_advance(&self.draft)
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.is_editable() && self.wizard.is_final_step()
    }

    pub fn advance(&mut self) -> bool {
        self.is_editable() && self.wizard.advance(&self.draft)
    }

    pub fn retreat(&mut self) -> bool {
        self.is_editable() && self.wizard.retreat()
    }

    pub fn set_name(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(|draft| draft.applicant_name = value)
    }

    pub fn set_email(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(|draft| draft.email = value)
    }

    pub fn set_phone(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(|draft| draft.phone = value)
    }

    pub fn select_course(&mut self, course_id: impl Into<String>) -> bool {
        let course_id = course_id.into();
        self.edit(|draft| draft.selected_course_id = course_id)
    }

    pub fn attach(&mut self, slot: DocumentSlot, file: UploadedFile) -> Result<bool, AttachmentError> {
        if !self.is_editable() {
            return Ok(false);
        }
        self.draft.attachments.attach(slot, file)?;
        self.touch();
        Ok(true)
    }

    pub fn detach(&mut self, slot: DocumentSlot) -> bool {
        self.edit(|draft| {
            draft.attachments.detach(slot);
        })
    }

    pub fn handle_drag(&mut self, slot: DocumentSlot, event: DragEvent) -> Result<(), AttachmentError> {
        if !self.is_editable() {
            return Ok(());
        }
        let dropped = matches!(event, DragEvent::Drop(_));
        self.draft.attachments.handle_drag(slot, event)?;
        if dropped {
            self.touch();
        }
        Ok(())
    }

    /// First half of a submission. Returns the payload to send and moves to
    /// `submitting`, or `None` when submitting is not possible right now
    /// (not on the final step, a call already in flight, already submitted,
    /// or aborted). Validation failures leave the draft editable.
    pub fn begin_submit(&mut self) -> Result<Option<FormPayload>, ApplicationValidationError> {
        if self.cancel.is_cancelled() {
            debug!(torn_down = self.torn_down, "submit refused after cancellation");
            return Ok(None);
        }
        if !self.can_submit() {
            debug!(state = self.state.label(), step = self.wizard.current_step(), "submit ignored");
            return Ok(None);
        }

        match self.draft.to_payload(&self.catalog) {
            Ok(payload) => {
                self.inline_error = None;
                self.state = SubmissionState::Submitting;
                debug!(fields = ?payload.field_names(), "application submission started");
                Ok(Some(payload))
            }
            Err(err) => {
                warn!(error = %err, "application failed local validation");
                self.inline_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Second half of a submission; ignored unless a call is in flight.
    pub fn complete_submit(
        &mut self,
        outcome: Result<SubmittedApplication, ApiError>,
    ) -> &SubmissionState {
        if self.state != SubmissionState::Submitting {
            return &self.state;
        }

        self.state = match outcome {
            Ok(response) => {
                let result = ApplicationResult::from_response(response, Utc::now());
                info!(application_id = %result.application_id, "application submitted");
                SubmissionState::Submitted(result)
            }
            Err(ApiError::Cancelled) => {
                debug!("application submission cancelled");
                if !self.torn_down {
                    self.cancel = CancellationToken::new();
                }
                SubmissionState::Editing
            }
            Err(err) => {
                warn!(error = %err, "application submission failed");
                SubmissionState::Failed {
                    message: err.user_message(Operation::SubmitApplication),
                }
            }
        };
        &self.state
    }

    /// Validates, sends and records the outcome. At most one call is ever
    /// in flight for a draft.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<&SubmissionState, ApplicationValidationError>
    where
        B: AdmissionsBackend + ?Sized,
    {
        let Some(payload) = self.begin_submit()? else {
            return Ok(&self.state);
        };

        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = backend.submit_application(payload) => result,
        };
        Ok(self.complete_submit(outcome))
    }

    /// Handle that aborts the in-flight submission when cancelled. Cancelling
    /// it while nothing is in flight blocks later submissions.
    pub fn abort_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Throws the submitted draft away and starts over at step 1.
    pub fn start_new(&mut self) {
        if matches!(self.state, SubmissionState::Submitted(_)) {
            self.draft = ApplicationDraft::new(self.policy);
            self.wizard.reset();
            self.state = SubmissionState::Editing;
            self.inline_error = None;
        }
    }

    /// Final: no remote call is made after this.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.cancel.cancel();
    }

    fn is_editable(&self) -> bool {
        matches!(
            self.state,
            SubmissionState::Editing | SubmissionState::Failed { .. }
        )
    }

    fn edit(&mut self, change: impl FnOnce(&mut ApplicationDraft)) -> bool {
        if !self.is_editable() {
            return false;
        }
        change(&mut self.draft);
        self.touch();
        true
    }

    /// Any edit clears a shown error and returns to `editing`.
    fn touch(&mut self) {
        self.inline_error = None;
        if matches!(self.state, SubmissionState::Failed { .. }) {
            self.state = SubmissionState::Editing;
        }
    }
}

impl Drop for ApplicationSubmissionFlow {
    fn drop(&mut self) {
        self.teardown();
    }
}
