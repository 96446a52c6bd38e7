//! Remote submission endpoint client

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{AnswerRecord, Submission};

const SUBMIT_PATH: &str = "/exam-attempts/submit-authenticated";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-category score as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDomainScore {
    pub domain_id: String,
    pub correct: u32,
    pub total: u32,
}

/// Per-question answer as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAnswer {
    pub question_id: String,
    pub selected_answers: Vec<String>,
    pub is_correct: bool,
    pub order_index: u32,
}

/// Wire payload for one delivery attempt
///
/// `local_id` is the idempotency key: it equals the submission's id and is
/// identical on every attempt for that submission, so the server can
/// deduplicate retried requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptUpload {
    pub exam_type_id: String,
    pub score: u8,
    pub passed: bool,
    pub duration: i64,
    pub submitted_at: i64,
    pub local_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_scores: Option<Vec<UploadDomainScore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<UploadAnswer>>,
}

impl AttemptUpload {
    /// Build the wire payload for a submission and its answer records
    #[must_use]
    pub fn from_submission(submission: &Submission, answers: Vec<AnswerRecord>) -> Self {
        let domain_scores = submission.domain_scores.as_ref().map(|scores| {
            scores
                .iter()
                .map(|score| UploadDomainScore {
                    domain_id: score.category_id.clone(),
                    correct: score.correct_count,
                    total: score.total_count,
                })
                .collect()
        });

        let answers = if answers.is_empty() {
            None
        } else {
            Some(
                answers
                    .into_iter()
                    .map(|answer| UploadAnswer {
                        question_id: answer.question_id,
                        selected_answers: answer.selected_answers,
                        is_correct: answer.is_correct,
                        order_index: answer.order_index,
                    })
                    .collect(),
            )
        };

        Self {
            exam_type_id: submission.exam_type_id.clone(),
            score: submission.score,
            passed: submission.passed,
            duration: submission.duration_secs,
            submitted_at: submission.submitted_at,
            local_id: submission.id.as_str(),
            domain_scores,
            answers,
        }
    }
}

/// Trait for the remote submission endpoint (async)
///
/// Any 2xx response is success; everything else, including transport errors
/// and timeouts, is a delivery failure the processor records uniformly.
#[allow(async_fn_in_trait)]
pub trait SubmissionClient {
    /// Deliver one attempt under the given access token
    async fn submit(&self, upload: &AttemptUpload, access_token: &str) -> Result<()>;
}

/// HTTP implementation of `SubmissionClient`
#[derive(Clone)]
pub struct HttpSubmissionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSubmissionClient {
    /// Create a client against the given API base URL with the default
    /// request timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = normalize_endpoint(base_url.into())?;
        Ok(Self {
            endpoint,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

impl SubmissionClient for HttpSubmissionClient {
    async fn submit(&self, upload: &AttemptUpload, access_token: &str) -> Result<()> {
        let url = format!("{}{SUBMIT_PATH}", self.endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .json(upload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Delivery(parse_api_error(status, &body)));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_endpoint(raw: String) -> Result<String> {
    let endpoint = raw.trim();
    if endpoint.is_empty() {
        return Err(Error::InvalidInput("endpoint must not be empty".to_string()));
    }
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "endpoint must include http:// or https://".to_string(),
        ))
    }
}
