use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::gate::{TokenActionState, TokenGate};
use super::redirect::RedirectSchedule;
use crate::api::{
    AccessToken, ActionAcknowledgement, AdmissionsBackend, ApiError, FormPayload, Operation,
};
use crate::config::UploadLimits;
use crate::workflows::signature::{SignatureCapture, SignatureError, SignatureMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 4] = [
        MaritalStatus::Single,
        MaritalStatus::Married,
        MaritalStatus::Divorced,
        MaritalStatus::Widowed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            MaritalStatus::Single => "single",
            MaritalStatus::Married => "married",
            MaritalStatus::Divorced => "divorced",
            MaritalStatus::Widowed => "widowed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisaEligibility {
    Yes,
    No,
    NotSure,
    AlreadyHave,
}

impl VisaEligibility {
    pub const ALL: [VisaEligibility; 4] = [
        VisaEligibility::Yes,
        VisaEligibility::No,
        VisaEligibility::NotSure,
        VisaEligibility::AlreadyHave,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            VisaEligibility::Yes => "yes",
            VisaEligibility::No => "no",
            VisaEligibility::NotSure => "not_sure",
            VisaEligibility::AlreadyHave => "already_have",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownChoice {
    kind: &'static str,
    value: String,
}

impl FromStr for MaritalStatus {
    type Err = UnknownChoice;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownChoice {
                kind: "marital status",
                value: value.to_string(),
            })
    }
}

impl FromStr for VisaEligibility {
    type Err = UnknownChoice;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|choice| choice.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownChoice {
                kind: "visa eligibility",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VisaEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("Please fill in all required fields")]
    MissingMaritalStatus,
    #[error("Please fill in all required fields")]
    MissingVisaEligibility,
    #[error("{}", missing_signature_message(.0))]
    MissingSignature(SignatureMethod),
    #[error("could not prepare signature: {0}")]
    SignatureExport(#[source] SignatureError),
}

fn missing_signature_message(method: &SignatureMethod) -> &'static str {
    match method {
        SignatureMethod::Draw => "Please draw your signature",
        SignatureMethod::Upload => "Please upload your signature",
    }
}

/// Fields the profile form collects.
#[derive(Debug)]
pub struct ProfileCompletionDraft {
    pub marital_status: Option<MaritalStatus>,
    pub visa_eligibility: Option<VisaEligibility>,
    pub signature: SignatureCapture,
}

impl ProfileCompletionDraft {
    pub fn new(signature: SignatureCapture) -> Self {
        Self {
            marital_status: None,
            visa_eligibility: None,
            signature,
        }
    }

    /// Checks fields in form order and stops at the first problem.
    pub fn to_payload(&self, token: &AccessToken) -> Result<FormPayload, ProfileValidationError> {
        let marital_status = self
            .marital_status
            .ok_or(ProfileValidationError::MissingMaritalStatus)?;
        let visa_eligibility = self
            .visa_eligibility
            .ok_or(ProfileValidationError::MissingVisaEligibility)?;
        if !self.signature.has_content() {
            return Err(ProfileValidationError::MissingSignature(
                self.signature.method(),
            ));
        }

        let signature = self.signature.export().map_err(|err| match err {
            SignatureError::EmptySignature => {
                ProfileValidationError::MissingSignature(self.signature.method())
            }
            other => ProfileValidationError::SignatureExport(other),
        })?;

        Ok(FormPayload::new()
            .text("token", token.expose())
            .text("marital_status", marital_status.as_str())
            .text("visa_eligible", visa_eligibility.as_str())
            .file("signature", signature))
    }
}

/// Applicant profile completion reached through an emailed token.
#[derive(Debug)]
pub struct ProfileCompletionFlow {
    gate: TokenGate,
    draft: ProfileCompletionDraft,
    inline_error: Option<String>,
}

impl ProfileCompletionFlow {
    pub fn load(token: Option<AccessToken>, redirect: RedirectSchedule, limits: &UploadLimits) -> Self {
        let signature = SignatureCapture::with_upload_limit(Some(limits.signature_max_bytes));
        Self::with_signature(token, redirect, signature)
    }

    pub fn with_signature(
        token: Option<AccessToken>,
        redirect: RedirectSchedule,
        signature: SignatureCapture,
    ) -> Self {
        let flow = Self {
            gate: TokenGate::new(token, TokenActionState::Pending, redirect),
            draft: ProfileCompletionDraft::new(signature),
            inline_error: None,
        };
        let token = flow.gate.token().map(AccessToken::redacted);
        debug!(
            state = flow.state().label(),
            token = ?token,
            "profile completion loaded"
        );
        flow
    }

    pub fn state(&self) -> &TokenActionState {
        self.gate.state()
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.gate.token()
    }

    pub fn draft(&self) -> &ProfileCompletionDraft {
        &self.draft
    }

    /// The form is only editable while it is shown.
    pub fn draft_mut(&mut self) -> Option<&mut ProfileCompletionDraft> {
        if !self.gate.is(&TokenActionState::Pending) {
            return None;
        }
        self.inline_error = None;
        Some(&mut self.draft)
    }

    pub fn signature_mut(&mut self) -> Option<&mut SignatureCapture> {
        self.draft_mut().map(|draft| &mut draft.signature)
    }

    pub fn set_marital_status(&mut self, status: MaritalStatus) -> bool {
        self.draft_mut()
            .map(|draft| draft.marital_status = Some(status))
            .is_some()
    }

    pub fn set_visa_eligibility(&mut self, choice: VisaEligibility) -> bool {
        self.draft_mut()
            .map(|draft| draft.visa_eligibility = Some(choice))
            .is_some()
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    /// Validates and moves to `submitting`. `None` when the form is not in
    /// a submittable state; validation failures keep it `pending`.
    pub fn begin_submit(&mut self) -> Result<Option<FormPayload>, ProfileValidationError> {
        if self.gate.is_cancelled() {
            debug!("profile submit refused after cancellation");
            return Ok(None);
        }
        if !self.gate.is(&TokenActionState::Pending) {
            debug!(state = self.state().label(), "profile submit ignored");
            return Ok(None);
        }
        let Some(token) = self.gate.token() else {
            return Ok(None);
        };

        match self.draft.to_payload(token) {
            Ok(payload) => {
                self.inline_error = None;
                self.gate.set_state(TokenActionState::Submitting);
                Ok(Some(payload))
            }
            Err(err) => {
                warn!(error = %err, "profile failed local validation");
                self.inline_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn complete_submit(
        &mut self,
        outcome: Result<ActionAcknowledgement, ApiError>,
    ) -> &TokenActionState {
        if !self.gate.is(&TokenActionState::Submitting) {
            return self.gate.state();
        }

        match outcome {
            Ok(ack) => {
                info!("profile completed");
                self.gate.succeed(ack.message);
            }
            Err(ApiError::Cancelled) => {
                debug!("profile completion cancelled");
                self.gate.renew_cancellation();
                self.gate.set_state(TokenActionState::Pending);
            }
            Err(err) => {
                warn!(error = %err, "profile completion failed");
                self.gate.set_state(TokenActionState::Error {
                    message: err.user_message(Operation::CompleteProfile),
                });
            }
        }
        self.gate.state()
    }

    pub async fn submit<B>(&mut self, backend: &B) -> Result<&TokenActionState, ProfileValidationError>
    where
        B: AdmissionsBackend + ?Sized,
    {
        let Some(payload) = self.begin_submit()? else {
            return Ok(self.gate.state());
        };

        let cancel = self.gate.cancellation();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = backend.complete_profile(payload) => result,
        };
        Ok(self.complete_submit(outcome))
    }

    /// Back to the form with everything entered so far.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.state(), TokenActionState::Error { .. }) {
            return false;
        }
        self.gate.set_state(TokenActionState::Pending);
        true
    }

    pub fn abort_handle(&self) -> CancellationToken {
        self.gate.cancellation()
    }

    pub async fn wait_for_redirect(&mut self) -> Option<bool> {
        self.gate.wait_for_redirect().await
    }

    pub fn teardown(&mut self) {
        self.gate.teardown();
    }
}
