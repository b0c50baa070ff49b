//! Analysis client: the only place that talks to the resume analysis service.
//!
//! One request per submission: a multipart POST carrying the file under the
//! `resume` field. No retries here; retry is a user decision.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{UploadError, GENERIC_FAILURE_MESSAGE};
use crate::models::{AnalysisResult, CandidateFile};

/// Multipart field name the service reads the resume from.
pub const RESUME_FIELD: &str = "resume";

/// The external service that turns a resume into role matches.
///
/// Held by `UploadSession` as `Arc<dyn AnalysisService>` so tests can script it.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, file: &CandidateFile) -> Result<AnalysisResult, UploadError>;
}

#[derive(Clone)]
pub struct HttpAnalysisService {
    client: Client,
    endpoint: String,
}

impl HttpAnalysisService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    #[tracing::instrument(skip(self, file), fields(endpoint = %self.endpoint, file_name = %file.name, size_bytes = file.size_bytes))]
    async fn analyze(&self, file: &CandidateFile) -> Result<AnalysisResult, UploadError> {
        let bytes = file
            .read_bytes()
            .await
            .map_err(|e| UploadError::NetworkFailure(format!("Could not read {}: {e}", file.name)))?;

        let part = Part::bytes(bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part(RESUME_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Analysis request failed");
                UploadError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Analysis service returned an error");
            return Err(UploadError::ServiceError(extract_error_message(&body)));
        }

        let result: AnalysisResult = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Analysis response was not a list of role matches");
            UploadError::ServiceError(format!("Unexpected response from analysis service: {e}"))
        })?;

        debug!(
            status = status.as_u16(),
            matches = result.len(),
            "Analysis request succeeded"
        );

        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: NestedError },
    Flat { error: String },
    Message { message: String },
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: String,
}

/// Longest plain-text error body surfaced verbatim.
const MAX_PLAIN_ERROR_CHARS: usize = 200;

/// Pulls a human-readable message out of an error body, falling back to the
/// generic text when the body carries none.
///
/// JSON bodies are read for one of the known error shapes. Anything else that
/// is not markup is taken as the message itself, trimmed and capped.
fn extract_error_message(body: &str) -> String {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => error.message,
        Ok(ErrorBody::Flat { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        Err(_) => plain_text_message(body),
    };

    if message.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}

fn plain_text_message(body: &str) -> String {
    let text = body.trim();
    if text.starts_with(['<', '{', '[']) {
        return String::new();
    }

    match text.char_indices().nth(MAX_PLAIN_ERROR_CHARS) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
