//! Per-question answer record
//!
//! Answers are stored separately from the submission and fetched fresh each
//! time a delivery payload is built.

use serde::{Deserialize, Serialize};

use super::SubmissionId;

/// One answered question within an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Submission this answer belongs to
    pub submission_id: SubmissionId,
    /// Question that was answered
    pub question_id: String,
    /// Options the user selected (multi-select supported)
    pub selected_answers: Vec<String>,
    /// Whether the selection was correct
    pub is_correct: bool,
    /// Position of the question within the attempt
    pub order_index: u32,
}

impl AnswerRecord {
    /// Create an answer record for a question within an attempt
    #[must_use]
    pub fn new(
        submission_id: SubmissionId,
        question_id: impl Into<String>,
        selected_answers: Vec<String>,
        is_correct: bool,
        order_index: u32,
    ) -> Self {
        Self {
            submission_id,
            question_id: question_id.into(),
            selected_answers,
            is_correct,
            order_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_record_new() {
        let submission_id = SubmissionId::new();
        let answer = AnswerRecord::new(submission_id, "q-17", vec!["b".to_string()], true, 3);
        assert_eq!(answer.submission_id, submission_id);
        assert_eq!(answer.question_id, "q-17");
        assert_eq!(answer.order_index, 3);
        assert!(answer.is_correct);
    }
}
