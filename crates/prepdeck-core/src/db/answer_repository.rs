//! Answer store implementation

use crate::error::Result;
use crate::models::{AnswerRecord, SubmissionId};
use libsql::{params, Connection, Row};

/// Trait for per-question answer storage operations (async)
#[allow(async_fn_in_trait)]
pub trait AnswerStore {
    /// Insert all answers for an attempt; duplicates are ignored
    async fn save_all(&self, answers: &[AnswerRecord]) -> Result<()>;

    /// List all answers for a submission, in attempt order
    async fn list_for_submission(&self, submission_id: &SubmissionId) -> Result<Vec<AnswerRecord>>;

    /// Purge all answers (account reset / logout)
    async fn delete_all(&self) -> Result<()>;
}

/// libSQL implementation of `AnswerStore`
pub struct LibSqlAnswerStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlAnswerStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse an answer from a database row
    fn parse_answer(row: &Row) -> Result<AnswerRecord> {
        let submission_id: String = row.get(0)?;
        let selected: String = row.get(2)?;

        Ok(AnswerRecord {
            submission_id: submission_id.parse().unwrap_or_default(),
            question_id: row.get(1)?,
            selected_answers: serde_json::from_str(&selected)?,
            is_correct: row.get::<i32>(3)? != 0,
            order_index: u32::try_from(row.get::<i64>(4)?).unwrap_or(0),
        })
    }
}

impl AnswerStore for LibSqlAnswerStore<'_> {
    async fn save_all(&self, answers: &[AnswerRecord]) -> Result<()> {
        if answers.is_empty() {
            return Ok(());
        }

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        for answer in answers {
            let selected = serde_json::to_string(&answer.selected_answers)?;
            let result = self
                .conn
                .execute(
                    "INSERT OR IGNORE INTO answers (
                        submission_id, question_id, selected_answers, is_correct, order_index
                    ) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        answer.submission_id.as_str(),
                        answer.question_id.clone(),
                        selected,
                        i32::from(answer.is_correct),
                        i64::from(answer.order_index),
                    ],
                )
                .await;

            if let Err(e) = result {
                self.conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    async fn list_for_submission(&self, submission_id: &SubmissionId) -> Result<Vec<AnswerRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT submission_id, question_id, selected_answers, is_correct, order_index
                 FROM answers
                 WHERE submission_id = ?1
                 ORDER BY order_index ASC",
                params![submission_id.as_str()],
            )
            .await?;

        let mut answers = Vec::new();
        while let Some(row) = rows.next().await? {
            answers.push(Self::parse_answer(&row)?);
        }

        Ok(answers)
    }

    async fn delete_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM answers", ()).await?;
        Ok(())
    }
}
