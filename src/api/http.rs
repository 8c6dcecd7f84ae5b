//! `reqwest` implementation of [`AdmissionsBackend`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::payload::{AcceptRequest, FormField, FormPayload};
use super::{
    AccessToken, ActionAcknowledgement, AdmissionsBackend, ApiEnvelope, ApiError, Operation,
    SubmittedApplication,
};
use crate::config::ApiConfig;

/// HTTP client for the admissions backend rooted at [`ApiConfig::base_url`].
#[derive(Debug, Clone)]
pub struct HttpAdmissionsClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpAdmissionsClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(map_transport)?;
        Ok(Self { client, config })
    }

    /// Reuses an existing client, e.g. to share a connection pool.
    pub fn with_client(client: reqwest::Client, config: ApiConfig) -> Self {
        Self { client, config }
    }

    pub fn endpoint(&self, operation: Operation) -> String {
        self.config.endpoint(operation.path())
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        operation: Operation,
        payload: FormPayload,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let url = self.endpoint(operation);
        debug!(%url, fields = ?payload.field_names(), "posting multipart form");
        let form = into_multipart(payload)?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport);
        finish(operation, response).await
    }
}

#[async_trait]
impl AdmissionsBackend for HttpAdmissionsClient {
    async fn submit_application(
        &self,
        payload: FormPayload,
    ) -> Result<SubmittedApplication, ApiError> {
        let envelope: ApiEnvelope<SubmittedApplication> = self
            .post_multipart(Operation::SubmitApplication, payload)
            .await?;
        envelope.data.ok_or_else(|| {
            ApiError::MalformedResponse("successful response carried no application data".into())
        })
    }

    async fn accept_application(
        &self,
        token: &AccessToken,
    ) -> Result<ActionAcknowledgement, ApiError> {
        let url = self.endpoint(Operation::AcceptApplication);
        debug!(%url, token = %token.redacted(), "posting acceptance");
        let body = AcceptRequest {
            token: token.expose().to_string(),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport);
        let envelope: ApiEnvelope<serde_json::Value> =
            finish(Operation::AcceptApplication, response).await?;
        Ok(ActionAcknowledgement {
            message: envelope.message,
        })
    }

    async fn complete_profile(
        &self,
        payload: FormPayload,
    ) -> Result<ActionAcknowledgement, ApiError> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .post_multipart(Operation::CompleteProfile, payload)
            .await?;
        Ok(ActionAcknowledgement {
            message: envelope.message,
        })
    }
}

fn into_multipart(payload: FormPayload) -> Result<Form, ApiError> {
    payload
        .into_fields()
        .into_iter()
        .try_fold(Form::new(), |form, field| match field {
            FormField::Text { name, value } => Ok(form.text(name, value)),
            FormField::File { name, file } => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)
                    .map_err(|err| {
                        ApiError::Transport(format!("invalid content type for '{name}': {err}"))
                    })?;
                Ok(form.part(name, part))
            }
        })
}

async fn finish<T: DeserializeOwned>(
    operation: Operation,
    response: Result<reqwest::Response, ApiError>,
) -> Result<ApiEnvelope<T>, ApiError> {
    let result = match response {
        Ok(response) => read_envelope(response).await,
        Err(err) => Err(err),
    };
    if let Err(err) = &result {
        error!(operation = operation.path(), error = %err, "admissions backend call failed");
    }
    result
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiEnvelope<T>, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport)?;
    interpret(status.as_u16(), &body)
}

/// Applies the error contract: non-2xx or `success: false` is a rejection
/// carrying the body's `message` when there is one.
pub(crate) fn interpret<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<ApiEnvelope<T>, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.message);
        return Err(ApiError::Rejected {
            status: Some(status),
            message,
        });
    }

    let envelope: ApiEnvelope<T> = serde_json::from_slice(body)
        .map_err(|err| ApiError::MalformedResponse(err.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Rejected {
            status: Some(status),
            message: envelope.message,
        });
    }
    Ok(envelope)
}

fn map_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Transport("request timed out".to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}
