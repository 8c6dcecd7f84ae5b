//! Boundary with the external admissions backend.
//!
//! The backend owns application storage, token issuance and e-mail. This
//! module only describes the three calls the site makes against it, the
//! normalized error contract, and a `reqwest` implementation.

pub mod http;
pub mod payload;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

pub use http::HttpAdmissionsClient;
pub use payload::{AcceptRequest, FormField, FormPayload, UploadedFile};

/// The remote operations, used for routing and for fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SubmitApplication,
    AcceptApplication,
    CompleteProfile,
}

impl Operation {
    pub const fn path(self) -> &'static str {
        match self {
            Operation::SubmitApplication => "apply",
            Operation::AcceptApplication => "accept",
            Operation::CompleteProfile => "complete-profile",
        }
    }

    pub const fn fallback_message(self) -> &'static str {
        match self {
            Operation::SubmitApplication => "Failed to submit application",
            Operation::AcceptApplication => "Failed to accept application",
            Operation::CompleteProfile => "Failed to complete profile",
        }
    }
}

/// Opaque, externally issued authorization string carried in an e-mail link.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Blank values count as "no token".
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Reads the first `token` parameter of a raw query string, with or
    /// without the leading `?`.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "token")
            .and_then(|(_, value)| Self::new(value.into_owned()))
    }

    pub fn from_url(url: &Url) -> Option<Self> {
        url.query().and_then(Self::from_query)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short prefix suitable for logs.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}***")
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&self.redacted()).finish()
    }
}

/// Envelope shared by every backend response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// `data` of a successful `POST /apply`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmittedApplication {
    pub application_id: String,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// Outcome of a successful token action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActionAcknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// Normalized remote failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("backend rejected the request (status {status:?}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Text shown to the user: the server's own message when it sent one,
    /// otherwise the operation's generic fallback.
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => operation.fallback_message().to_string(),
        }
    }
}

/// The external backend as seen by the workflows.
#[async_trait]
pub trait AdmissionsBackend: Send + Sync {
    /// `POST /apply` with the applicant's multipart form.
    async fn submit_application(
        &self,
        payload: FormPayload,
    ) -> Result<SubmittedApplication, ApiError>;

    /// `POST /accept` with `{ token }`.
    async fn accept_application(
        &self,
        token: &AccessToken,
    ) -> Result<ActionAcknowledgement, ApiError>;

    /// `POST /complete-profile` with the student's multipart form.
    async fn complete_profile(
        &self,
        payload: FormPayload,
    ) -> Result<ActionAcknowledgement, ApiError>;
}
