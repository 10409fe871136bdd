//! REST client for the registration backend.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET  /events/{eventId}/registration-config`
//! - `PUT  /events/{eventId}/registration-config`
//! - `POST /events/{eventId}/registrations` (multipart)

use crate::config::ApiConfig;
use crate::error::{RepositoryError, SubmissionError};
use crate::repository::{ConfigRepository, RepositoryFuture};
use crate::submission::{RegistrationSubmission, SubmissionClient, SubmissionFuture, SubmissionReceipt};
use crate::types::{EventId, FormConfig};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

/// Header carrying the per-attempt deduplication key
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// HTTP implementation of both collaborators
#[derive(Clone, Debug)]
pub struct HttpRegistrationApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRegistrationApi {
    /// Create a client for `base_url`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Create a client from configuration
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        let api = Self::new(&config.base_url);
        match &config.token {
            Some(token) => api.with_token(token.clone()),
            None => api,
        }
    }

    /// Send `token` as a bearer credential
    #[must_use]
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    fn config_url(&self, event_id: EventId) -> String {
        format!("{}/events/{event_id}/registration-config", self.base_url)
    }

    fn registrations_url(&self, event_id: EventId) -> String {
        format!("{}/events/{event_id}/registrations", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    #[tracing::instrument(skip_all, fields(%event_id))]
    async fn fetch_config(&self, event_id: EventId) -> Result<FormConfig, RepositoryError> {
        let url = self.config_url(event_id);
        tracing::debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound);
        }
        let response = reject_failure(response).await.map_err(
            |(status, message)| RepositoryError::Rejected { status, message },
        )?;

        response
            .json()
            .await
            .map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    #[tracing::instrument(skip_all, fields(%event_id))]
    async fn store_config(
        &self,
        event_id: EventId,
        config: FormConfig,
    ) -> Result<FormConfig, RepositoryError> {
        let url = self.config_url(event_id);
        tracing::debug!("PUT {}", url);

        let response = self
            .authorize(self.client.put(&url))
            .json(&config)
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        let response = reject_failure(response).await.map_err(
            |(status, message)| RepositoryError::Rejected { status, message },
        )?;

        response
            .json()
            .await
            .map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    #[tracing::instrument(
        skip_all,
        fields(event_id = %submission.event_id, key = %submission.idempotency_key)
    )]
    async fn post_submission(
        &self,
        submission: RegistrationSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let url = self.registrations_url(submission.event_id);
        let form = multipart_form(&submission)?;
        tracing::debug!(files = submission.files.len(), "POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .header(IDEMPOTENCY_KEY_HEADER, submission.idempotency_key.to_string())
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let response = reject_failure(response)
            .await
            .map_err(|(status, message)| SubmissionError::Rejected { status, message })?;

        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(SubmissionReceipt::default());
        }
        serde_json::from_str(&body).map_err(|e| SubmissionError::Transport(e.to_string()))
    }
}

/// Build the multipart body: `registrationData`, `saveAsDraft`, `files[{fieldId}]`
fn multipart_form(submission: &RegistrationSubmission) -> Result<Form, SubmissionError> {
    let data = submission
        .registration_data_json()
        .map_err(|e| SubmissionError::Transport(e.to_string()))?;

    let mut form = Form::new()
        .text("registrationData", data)
        .text("saveAsDraft", submission.save_as_draft.to_string());

    for (field_id, blob) in &submission.files {
        let part = Part::bytes(blob.bytes.clone())
            .file_name(blob.name.clone())
            .mime_str(&blob.content_type)
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        form = form.part(format!("files[{field_id}]"), part);
    }

    Ok(form)
}

/// Pass successful responses through; turn the rest into `(status, message)`
async fn reject_failure(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });

    tracing::warn!(status = status.as_u16(), %message, "Registration backend rejected request");
    Err((status.as_u16(), message))
}

impl ConfigRepository for HttpRegistrationApi {
    fn load(&self, event_id: EventId) -> RepositoryFuture<FormConfig> {
        let api = self.clone();
        Box::pin(async move { api.fetch_config(event_id).await })
    }

    fn save(&self, event_id: EventId, config: FormConfig) -> RepositoryFuture<FormConfig> {
        let api = self.clone();
        Box::pin(async move { api.store_config(event_id, config).await })
    }
}

impl SubmissionClient for HttpRegistrationApi {
    fn submit(&self, submission: RegistrationSubmission) -> SubmissionFuture {
        let api = self.clone();
        Box::pin(async move { api.post_submission(submission).await })
    }
}
