//! Sync processor
//!
//! Orchestrates draining queued submissions against the remote endpoint.
//! One pass processes a snapshot of a status queue strictly sequentially;
//! per-item delivery failures are recorded in the pass report and never
//! abort the batch. A pass lock serializes overlapping passes so at most
//! one delivery attempt per submission is in flight at a time.

use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::{AnswerStore, SubmissionStore};
use crate::error::Result;
use crate::models::{Submission, SyncStatus};

use super::backoff::Backoff;
use super::client::{AttemptUpload, SubmissionClient};

/// Authenticated user on whose behalf a pass runs
#[derive(Clone, PartialEq, Eq)]
pub struct SyncIdentity {
    /// Owning user id stamped on synced submissions
    pub owner_id: String,
    /// Bearer token for the remote endpoint
    pub access_token: String,
}

impl SyncIdentity {
    /// Create an identity from an owner id and access token
    pub fn new(owner_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            access_token: access_token.into(),
        }
    }
}

impl std::fmt::Debug for SyncIdentity {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SyncIdentity")
            .field("owner_id", &self.owner_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// One failed item within a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncItemError {
    /// Submission that failed to deliver
    pub id: String,
    /// Delivery error message
    pub message: String,
}

/// Aggregate outcome of one sync or retry pass
///
/// Partial failure (some synced, some failed) is a normal outcome; callers
/// should treat `success() == false` as "will retry later", not as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Submissions acknowledged by the server this pass
    pub synced: usize,
    /// Submissions that failed delivery this pass
    pub failed: usize,
    /// Per-item failure details
    pub errors: Vec<SyncItemError>,
}

impl SyncReport {
    /// Whether every attempted submission was delivered
    #[must_use]
    pub const fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Drains queued submissions against the remote endpoint
///
/// Stores and client are injected, so tests can substitute doubles and no
/// global connection state is involved.
pub struct SyncProcessor<'a, S, A, C> {
    submissions: &'a S,
    answers: &'a A,
    client: &'a C,
    backoff: Backoff,
    pass_lock: Mutex<()>,
}

impl<'a, S, A, C> SyncProcessor<'a, S, A, C>
where
    S: SubmissionStore,
    A: AnswerStore,
    C: SubmissionClient,
{
    /// Create a processor with the default backoff policy
    pub fn new(submissions: &'a S, answers: &'a A, client: &'a C) -> Self {
        Self {
            submissions,
            answers,
            client,
            backoff: Backoff::default(),
            pass_lock: Mutex::new(()),
        }
    }

    /// Override the backoff policy (shorter bases in tests)
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempt delivery for every `Pending` submission, oldest first
    ///
    /// With no identity this is a successful no-op: submissions stay
    /// local-only until an owner is known.
    pub async fn sync_pending(&self, identity: Option<&SyncIdentity>) -> Result<SyncReport> {
        self.drain(SyncStatus::Pending, identity, false).await
    }

    /// Re-attempt delivery for every `Failed` submission, oldest first,
    /// waiting out the backoff for its current retry count before each call
    pub async fn retry_failed(&self, identity: Option<&SyncIdentity>) -> Result<SyncReport> {
        self.drain(SyncStatus::Failed, identity, true).await
    }

    async fn drain(
        &self,
        status: SyncStatus,
        identity: Option<&SyncIdentity>,
        wait_backoff: bool,
    ) -> Result<SyncReport> {
        let Some(identity) = identity else {
            tracing::debug!("No authenticated owner; leaving {status} submissions local-only");
            return Ok(SyncReport::default());
        };

        let _pass = self.pass_lock.lock().await;
        let queue = self.submissions.list_by_status(status).await?;
        if queue.is_empty() {
            return Ok(SyncReport::default());
        }

        tracing::debug!(count = queue.len(), %status, "Starting sync pass");
        let mut report = SyncReport::default();

        for submission in queue {
            if !submission.is_owned() {
                tracing::debug!(id = %submission.id, "Skipping unowned submission");
                continue;
            }

            if wait_backoff {
                tokio::time::sleep(self.backoff.delay(submission.sync_retries)).await;
            }

            match self.deliver(&submission, identity).await {
                Ok(()) => {
                    self.submissions.mark_synced(&submission.id).await?;
                    report.synced += 1;
                    tracing::debug!(id = %submission.id, "Submission synced");
                }
                Err(err) => {
                    self.submissions.mark_failed(&submission.id).await?;
                    report.failed += 1;
                    report.errors.push(SyncItemError {
                        id: submission.id.as_str(),
                        message: err.to_string(),
                    });
                    tracing::warn!(id = %submission.id, error = %err, "Submission delivery failed");
                }
            }
        }

        tracing::info!(
            synced = report.synced,
            failed = report.failed,
            %status,
            "Sync pass finished"
        );
        Ok(report)
    }

    /// Build the wire payload and issue one delivery call
    ///
    /// Answers are fetched fresh from the answer store on every attempt so
    /// the payload reflects the latest local state.
    async fn deliver(&self, submission: &Submission, identity: &SyncIdentity) -> Result<()> {
        let answers = self.answers.list_for_submission(&submission.id).await?;
        let upload = AttemptUpload::from_submission(submission, answers);
        self.client.submit(&upload, &identity.access_token).await
    }
}
