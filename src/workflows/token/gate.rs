use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::redirect::{PendingRedirect, RedirectSchedule};
use crate::api::AccessToken;

/// Shared shape of the token-gated flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TokenActionState {
    /// The page was opened without a token; nothing can happen.
    NoToken,
    Pending,
    /// Waiting for the operator to affirm an irreversible action.
    Confirming,
    Submitting,
    Success { message: Option<String> },
    Error { message: String },
}

impl TokenActionState {
    pub const fn label(&self) -> &'static str {
        match self {
            TokenActionState::NoToken => "no_token",
            TokenActionState::Pending => "pending",
            TokenActionState::Confirming => "confirming",
            TokenActionState::Submitting => "submitting",
            TokenActionState::Success { .. } => "success",
            TokenActionState::Error { .. } => "error",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            TokenActionState::NoToken | TokenActionState::Success { .. }
        )
    }
}

/// Token, state and lifetime plumbing common to both flows.
#[derive(Debug)]
pub(super) struct TokenGate {
    token: Option<AccessToken>,
    state: TokenActionState,
    redirect: RedirectSchedule,
    pending_redirect: Option<PendingRedirect>,
    cancel: CancellationToken,
    torn_down: bool,
}

impl TokenGate {
    pub(super) fn new(
        token: Option<AccessToken>,
        with_token: TokenActionState,
        redirect: RedirectSchedule,
    ) -> Self {
        let state = if token.is_some() {
            with_token
        } else {
            TokenActionState::NoToken
        };
        Self {
            token,
            state,
            redirect,
            pending_redirect: None,
            cancel: CancellationToken::new(),
            torn_down: false,
        }
    }

    pub(super) fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub(super) fn state(&self) -> &TokenActionState {
        &self.state
    }

    pub(super) fn is(&self, state: &TokenActionState) -> bool {
        &self.state == state
    }

    pub(super) fn transition(&mut self, from: &TokenActionState, to: TokenActionState) -> bool {
        if &self.state != from {
            return false;
        }
        debug!(from = from.label(), to = to.label(), "token flow transition");
        self.state = to;
        true
    }

    pub(super) fn set_state(&mut self, state: TokenActionState) {
        self.state = state;
    }

    pub(super) fn succeed(&mut self, message: Option<String>) {
        self.state = TokenActionState::Success { message };
        self.pending_redirect = self.redirect.schedule(&self.cancel);
    }

    /// Used after a cancelled call so a later attempt is not born cancelled.
    /// Never undoes a teardown.
    pub(super) fn renew_cancellation(&mut self) {
        if !self.torn_down {
            self.cancel = CancellationToken::new();
        }
    }

    /// True once the abort handle fired or the flow was torn down; no call
    /// may start.
    pub(super) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(super) fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(super) async fn wait_for_redirect(&mut self) -> Option<bool> {
        match self.pending_redirect.take() {
            Some(pending) => Some(pending.wait().await),
            None => None,
        }
    }

    pub(super) fn teardown(&mut self) {
        self.torn_down = true;
        self.cancel.cancel();
        if let Some(pending) = &self.pending_redirect {
            pending.cancel();
        }
    }
}

impl Drop for TokenGate {
    fn drop(&mut self) {
        self.teardown();
    }
}
