use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::gate::{TokenActionState, TokenGate};
use super::redirect::RedirectSchedule;
use crate::api::{AccessToken, ActionAcknowledgement, AdmissionsBackend, ApiError, Operation};

/// Administrator acceptance of an application, gated by an emailed token
/// and an explicit confirmation.
#[derive(Debug)]
pub struct AdminAcceptanceFlow {
    gate: TokenGate,
}

impl AdminAcceptanceFlow {
    /// With a token present the confirmation is requested straight away.
    pub fn load(token: Option<AccessToken>, redirect: RedirectSchedule) -> Self {
        let flow = Self {
            gate: TokenGate::new(token, TokenActionState::Confirming, redirect),
        };
        let token = flow.gate.token().map(AccessToken::redacted);
        debug!(
            state = flow.state().label(),
            token = ?token,
            "admin acceptance loaded"
        );
        flow
    }

    pub fn state(&self) -> &TokenActionState {
        self.gate.state()
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.gate.token()
    }

    pub fn request_confirmation(&mut self) -> bool {
        self.gate
            .transition(&TokenActionState::Pending, TokenActionState::Confirming)
    }

    /// Backs out of the dialog without contacting the backend.
    pub fn cancel_confirmation(&mut self) -> bool {
        self.gate
            .transition(&TokenActionState::Confirming, TokenActionState::Pending)
    }

    /// Moves from `confirming` to `submitting` and hands back the token to
    /// send. `None` in any other state.
    pub fn begin_accept(&mut self) -> Option<AccessToken> {
        if self.gate.is_cancelled() {
            debug!("accept refused after cancellation");
            return None;
        }
        if !self.gate.is(&TokenActionState::Confirming) {
            debug!(state = self.state().label(), "accept ignored");
            return None;
        }
        let token = self.gate.token()?.clone();
        self.gate.set_state(TokenActionState::Submitting);
        Some(token)
    }

    pub fn complete_accept(
        &mut self,
        outcome: Result<ActionAcknowledgement, ApiError>,
    ) -> &TokenActionState {
        if !self.gate.is(&TokenActionState::Submitting) {
            return self.gate.state();
        }

        match outcome {
            Ok(ack) => {
                info!("application accepted");
                self.gate.succeed(ack.message);
            }
            Err(ApiError::Cancelled) => {
                debug!("acceptance cancelled");
                self.gate.renew_cancellation();
                self.gate.set_state(TokenActionState::Pending);
            }
            Err(err) => {
                warn!(error = %err, "acceptance failed");
                self.gate.set_state(TokenActionState::Error {
                    message: err.user_message(Operation::AcceptApplication),
                });
            }
        }
        self.gate.state()
    }

    /// The confirmed action. Calls the backend at most once per
    /// confirmation.
    pub async fn accept<B>(&mut self, backend: &B) -> &TokenActionState
    where
        B: AdmissionsBackend + ?Sized,
    {
        let Some(token) = self.begin_accept() else {
            return self.gate.state();
        };

        let cancel = self.gate.cancellation();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = backend.accept_application(&token) => result,
        };
        self.complete_accept(outcome)
    }

    /// After a failure the operator has to confirm again.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.state(), TokenActionState::Error { .. }) {
            return false;
        }
        self.gate.set_state(TokenActionState::Confirming);
        true
    }

    pub fn abort_handle(&self) -> CancellationToken {
        self.gate.cancellation()
    }

    /// Waits for the post-success redirect. `None` if none was scheduled,
    /// otherwise whether the navigation happened.
    pub async fn wait_for_redirect(&mut self) -> Option<bool> {
        self.gate.wait_for_redirect().await
    }

    pub fn teardown(&mut self) {
        self.gate.teardown();
    }
}
