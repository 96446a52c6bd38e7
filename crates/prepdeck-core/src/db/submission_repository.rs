//! Submission store implementation
//!
//! Pure data access for the delivery queue; all business rules live in the
//! sync processor. Every mutation is a single atomic write scoped to one
//! submission id and is durable before the call returns.

use crate::error::Result;
use crate::models::{DomainScore, Submission, SubmissionId, SyncStatus};
use libsql::{params, Connection, Row};

/// Trait for submission storage operations (async)
#[allow(async_fn_in_trait)]
pub trait SubmissionStore {
    /// Idempotent insert; a duplicate `id` is a no-op
    async fn save(&self, submission: &Submission) -> Result<()>;

    /// Get a submission by ID
    async fn get(&self, id: &SubmissionId) -> Result<Option<Submission>>;

    /// List all submissions in a given state, oldest `created_at` first
    async fn list_by_status(&self, status: SyncStatus) -> Result<Vec<Submission>>;

    /// Count submissions in a given state
    async fn count_by_status(&self, status: SyncStatus) -> Result<u64>;

    /// Record a successful delivery: status Synced, `synced_at` now, retries 0
    async fn mark_synced(&self, id: &SubmissionId) -> Result<()>;

    /// Record a failed delivery: status Failed, retries incremented
    async fn mark_failed(&self, id: &SubmissionId) -> Result<()>;

    /// Purge all submissions (account reset / logout)
    async fn delete_all(&self) -> Result<()>;
}

/// libSQL implementation of `SubmissionStore`
pub struct LibSqlSubmissionStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSubmissionStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a submission from a database row
    fn parse_submission(row: &Row) -> Result<Submission> {
        let id: String = row.get(0)?;
        let domain_scores: Option<String> = row.get(7)?;
        let domain_scores: Option<Vec<DomainScore>> = match domain_scores {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        let status: String = row.get(8)?;

        Ok(Submission {
            id: id.parse().unwrap_or_default(),
            owner_id: row.get(1)?,
            exam_type_id: row.get(2)?,
            score: u8::try_from(row.get::<i64>(3)?).unwrap_or(0),
            passed: row.get::<i32>(4)? != 0,
            duration_secs: row.get(5)?,
            submitted_at: row.get(6)?,
            domain_scores,
            sync_status: status.parse()?,
            sync_retries: u32::try_from(row.get::<i64>(9)?).unwrap_or(0),
            synced_at: row.get(10)?,
            created_at: row.get(11)?,
        })
    }
}

const SELECT_COLUMNS: &str = "id, owner_id, exam_type_id, score, passed, duration_secs, \
     submitted_at, domain_scores, sync_status, sync_retries, synced_at, created_at";

impl SubmissionStore for LibSqlSubmissionStore<'_> {
    async fn save(&self, submission: &Submission) -> Result<()> {
        let domain_scores = submission
            .domain_scores
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn
            .execute(
                "INSERT OR IGNORE INTO submissions (
                    id, owner_id, exam_type_id, score, passed, duration_secs,
                    submitted_at, domain_scores, sync_status, sync_retries,
                    synced_at, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    submission.id.as_str(),
                    submission.owner_id.clone(),
                    submission.exam_type_id.clone(),
                    i64::from(submission.score),
                    i32::from(submission.passed),
                    submission.duration_secs,
                    submission.submitted_at,
                    domain_scores,
                    submission.sync_status.as_str(),
                    i64::from(submission.sync_retries),
                    submission.synced_at,
                    submission.created_at,
                ],
            )
            .await?;

        Ok(())
    }

    async fn get(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM submissions WHERE id = ?1"),
                params![id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_submission(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_status(&self, status: SyncStatus) -> Result<Vec<Submission>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM submissions
                     WHERE sync_status = ?1
                     ORDER BY created_at ASC"
                ),
                params![status.as_str()],
            )
            .await?;

        let mut submissions = Vec::new();
        while let Some(row) = rows.next().await? {
            submissions.push(Self::parse_submission(&row)?);
        }

        Ok(submissions)
    }

    async fn count_by_status(&self, status: SyncStatus) -> Result<u64> {
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM submissions WHERE sync_status = ?1",
                params![status.as_str()],
            )
            .await?;

        let count = match rows.next().await? {
            Some(row) => u64::try_from(row.get::<i64>(0)?).unwrap_or(0),
            None => 0,
        };

        Ok(count)
    }

    async fn mark_synced(&self, id: &SubmissionId) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        // No-op for a missing id; nothing to surface to the caller
        self.conn
            .execute(
                "UPDATE submissions
                 SET sync_status = 'SYNCED', synced_at = ?1, sync_retries = 0
                 WHERE id = ?2",
                params![now, id.as_str()],
            )
            .await?;

        Ok(())
    }

    async fn mark_failed(&self, id: &SubmissionId) -> Result<()> {
        // A record never regresses out of SYNCED
        self.conn
            .execute(
                "UPDATE submissions
                 SET sync_status = 'FAILED', sync_retries = sync_retries + 1
                 WHERE id = ?1 AND sync_status != 'SYNCED'",
                params![id.as_str()],
            )
            .await?;

        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM submissions", ()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn pending(exam: &str, created_at: i64) -> Submission {
        let mut submission = Submission::new(exam, 75, true, 1800).with_owner("user-1");
        submission.created_at = created_at;
        submission
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_and_get() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        let submission = Submission::new("exam-aws-saa", 82, true, 3600)
            .with_owner("user-1")
            .with_domain_scores(vec![DomainScore {
                category_id: "networking".to_string(),
                correct_count: 7,
                total_count: 10,
            }]);
        store.save(&submission).await.unwrap();

        let fetched = store.get(&submission.id).await.unwrap().unwrap();
        assert_eq!(fetched, submission);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_is_idempotent() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        let submission = pending("exam-aws-saa", 1000);
        store.save(&submission).await.unwrap();

        // Second save with the same id must not overwrite or duplicate
        let mut altered = submission.clone();
        altered.score = 1;
        store.save(&altered).await.unwrap();

        assert_eq!(store.count_by_status(SyncStatus::Pending).await.unwrap(), 1);
        let fetched = store.get(&submission.id).await.unwrap().unwrap();
        assert_eq!(fetched.score, submission.score);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_by_status_fifo() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        let third = pending("exam-c", 3000);
        let first = pending("exam-a", 1000);
        let second = pending("exam-b", 2000);
        for submission in [&third, &first, &second] {
            store.save(submission).await.unwrap();
        }

        let listed = store.list_by_status(SyncStatus::Pending).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_synced_sets_timestamp_and_resets_retries() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        let submission = pending("exam-a", 1000);
        store.save(&submission).await.unwrap();
        store.mark_failed(&submission.id).await.unwrap();
        store.mark_failed(&submission.id).await.unwrap();

        store.mark_synced(&submission.id).await.unwrap();

        let fetched = store.get(&submission.id).await.unwrap().unwrap();
        assert_eq!(fetched.sync_status, SyncStatus::Synced);
        assert_eq!(fetched.sync_retries, 0);
        assert!(fetched.synced_at.is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_failed_increments_retries() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        let submission = pending("exam-a", 1000);
        store.save(&submission).await.unwrap();

        store.mark_failed(&submission.id).await.unwrap();
        let fetched = store.get(&submission.id).await.unwrap().unwrap();
        assert_eq!(fetched.sync_status, SyncStatus::Failed);
        assert_eq!(fetched.sync_retries, 1);
        assert!(fetched.synced_at.is_none());

        store.mark_failed(&submission.id).await.unwrap();
        let fetched = store.get(&submission.id).await.unwrap().unwrap();
        assert_eq!(fetched.sync_retries, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_failed_never_regresses_synced() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        let submission = pending("exam-a", 1000);
        store.save(&submission).await.unwrap();
        store.mark_synced(&submission.id).await.unwrap();

        store.mark_failed(&submission.id).await.unwrap();

        let fetched = store.get(&submission.id).await.unwrap().unwrap();
        assert_eq!(fetched.sync_status, SyncStatus::Synced);
        assert_eq!(fetched.sync_retries, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_on_missing_id_is_noop() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        let ghost = SubmissionId::new();
        store.mark_synced(&ghost).await.unwrap();
        store.mark_failed(&ghost).await.unwrap();

        assert_eq!(store.get(&ghost).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_all() {
        let db = setup().await;
        let store = LibSqlSubmissionStore::new(db.connection());

        store.save(&pending("exam-a", 1000)).await.unwrap();
        store.save(&pending("exam-b", 2000)).await.unwrap();

        store.delete_all().await.unwrap();

        assert_eq!(store.count_by_status(SyncStatus::Pending).await.unwrap(), 0);
    }
}
