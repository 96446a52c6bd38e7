//! prepdeck-core - Core library for Prepdeck
//!
//! This crate contains the shared models, database layer, and the result
//! sync engine used by all Prepdeck interfaces (mobile, desktop, CLI).

pub mod db;
pub mod error;
pub mod models;
pub mod sync;

pub use error::{Error, Result};
pub use models::{AnswerRecord, DomainScore, Submission, SubmissionId, SyncStatus};
