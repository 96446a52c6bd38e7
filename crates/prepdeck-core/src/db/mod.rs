//! Database layer for Prepdeck

mod answer_repository;
mod connection;
mod migrations;
mod submission_repository;

pub use answer_repository::{AnswerStore, LibSqlAnswerStore};
pub use connection::Database;
pub use submission_repository::{LibSqlSubmissionStore, SubmissionStore};
