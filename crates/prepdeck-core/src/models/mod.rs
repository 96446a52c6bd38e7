//! Data models for Prepdeck

mod answer;
mod submission;

pub use answer::AnswerRecord;
pub use submission::{DomainScore, Submission, SubmissionId, SyncStatus};
