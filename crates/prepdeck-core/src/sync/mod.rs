//! Result sync engine for Prepdeck
//!
//! Drains locally queued submissions against the remote endpoint, with
//! exponential backoff between retry attempts and idempotent delivery keyed
//! by the submission id.

mod backoff;
mod client;
mod processor;

pub use backoff::{Backoff, BASE_DELAY_MS};
pub use client::{
    AttemptUpload, HttpSubmissionClient, SubmissionClient, UploadAnswer, UploadDomainScore,
};
pub use processor::{SyncIdentity, SyncItemError, SyncProcessor, SyncReport};
