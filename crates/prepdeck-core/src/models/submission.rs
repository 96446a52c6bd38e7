//! Submission model
//!
//! A submission is one locally-produced exam or practice result queued for
//! delivery to the remote service. Its `id` doubles as the idempotency key
//! sent on every delivery attempt, so retries never create duplicates
//! server-side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// A unique identifier for a submission, using UUID v7 (time-sortable)
///
/// Assigned once at creation and never changed; sent as the `localId`
/// idempotency key on every delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Create a new unique submission ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubmissionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Delivery lifecycle state of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Recorded locally, not yet attempted
    Pending,
    /// Acknowledged by the remote endpoint; terminal
    Synced,
    /// At least one delivery attempt failed; retried on the next retry pass
    Failed,
}

impl SyncStatus {
    /// Stable string form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Synced => "SYNCED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SYNCED" => Ok(Self::Synced),
            "FAILED" => Ok(Self::Failed),
            other => Err(Error::InvalidInput(format!("Unknown sync status: {other}"))),
        }
    }
}

/// Per-category score breakdown, computed once and cached on the submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScore {
    /// Question category this row covers
    pub category_id: String,
    /// Correctly answered questions in the category
    pub correct_count: u32,
    /// Total questions in the category
    pub total_count: u32,
}

/// A locally recorded exam/practice result and its sync lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier; also the wire idempotency key
    pub id: SubmissionId,
    /// Authenticated user this result belongs to; unowned submissions are
    /// kept local-only and never attempted
    pub owner_id: Option<String>,
    /// Exam type the attempt was taken against
    pub exam_type_id: String,
    /// Score in percent (0-100)
    pub score: u8,
    /// Whether the attempt met the pass threshold
    pub passed: bool,
    /// Attempt duration in seconds
    pub duration_secs: i64,
    /// When the attempt was submitted by the user (Unix ms)
    pub submitted_at: i64,
    /// Cached per-category breakdown, if computed
    pub domain_scores: Option<Vec<DomainScore>>,
    /// Delivery lifecycle state
    pub sync_status: SyncStatus,
    /// Failed delivery attempts so far; drives backoff, reset on success
    pub sync_retries: u32,
    /// Set only on transition into `Synced` (Unix ms)
    pub synced_at: Option<i64>,
    /// Creation timestamp (Unix ms), never mutated
    pub created_at: i64,
}

impl Submission {
    /// Create a new pending submission for a finished attempt
    ///
    /// Scores above 100 are clamped; `created_at` and `submitted_at` are
    /// both set to now.
    #[must_use]
    pub fn new(exam_type_id: impl Into<String>, score: u8, passed: bool, duration_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: SubmissionId::new(),
            owner_id: None,
            exam_type_id: exam_type_id.into(),
            score: score.min(100),
            passed,
            duration_secs,
            submitted_at: now,
            domain_scores: None,
            sync_status: SyncStatus::Pending,
            sync_retries: 0,
            synced_at: None,
            created_at: now,
        }
    }

    /// Attach the owning user
    #[must_use]
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Cache the per-category breakdown
    #[must_use]
    pub fn with_domain_scores(mut self, scores: Vec<DomainScore>) -> Self {
        self.domain_scores = Some(scores);
        self
    }

    /// Whether this submission may be attempted for the given owner
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_submission_id_unique() {
        let id1 = SubmissionId::new();
        let id2 = SubmissionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_submission_id_parse_roundtrip() {
        let id = SubmissionId::new();
        let parsed: SubmissionId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_sync_status_roundtrip() {
        for status in [SyncStatus::Pending, SyncStatus::Synced, SyncStatus::Failed] {
            let parsed: SyncStatus = status.as_str().parse().unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_sync_status_rejects_unknown() {
        assert!("DONE".parse::<SyncStatus>().is_err());
    }

    #[test]
    fn test_submission_new_defaults() {
        let submission = Submission::new("exam-aws-saa", 82, true, 3600);
        assert_eq!(submission.sync_status, SyncStatus::Pending);
        assert_eq!(submission.sync_retries, 0);
        assert!(submission.synced_at.is_none());
        assert!(submission.owner_id.is_none());
        assert_eq!(submission.created_at, submission.submitted_at);
        assert!(submission.created_at > 0);
    }

    #[test]
    fn test_submission_score_clamped() {
        let submission = Submission::new("exam-aws-saa", 150, true, 10);
        assert_eq!(submission.score, 100);
    }

    #[test]
    fn test_submission_with_owner() {
        let submission = Submission::new("exam-aws-saa", 50, false, 10).with_owner("user-1");
        assert!(submission.is_owned());
        assert_eq!(submission.owner_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_submission_with_domain_scores() {
        let submission = Submission::new("exam-aws-saa", 70, true, 10).with_domain_scores(vec![
            DomainScore {
                category_id: "networking".to_string(),
                correct_count: 7,
                total_count: 10,
            },
        ]);
        let scores = submission.domain_scores.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].category_id, "networking");
    }
}
