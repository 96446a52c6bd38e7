//! Database migrations

use crate::error::Result;
use libsql::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version < 1 {
        migrate_v1(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
async fn get_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

/// Migration to version 1: submissions and answers
async fn migrate_v1(conn: &Connection) -> Result<()> {
    // libsql doesn't have execute_batch, so we run each statement separately
    // inside a transaction for atomicity

    conn.execute("BEGIN TRANSACTION", ()).await?;

    let statements = [
        // Schema version tracking
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        // Submissions queued for delivery
        "CREATE TABLE IF NOT EXISTS submissions (
            id TEXT PRIMARY KEY,
            owner_id TEXT,
            exam_type_id TEXT NOT NULL,
            score INTEGER NOT NULL,
            passed INTEGER NOT NULL DEFAULT 0,
            duration_secs INTEGER NOT NULL,
            submitted_at INTEGER NOT NULL,
            domain_scores TEXT,
            sync_status TEXT NOT NULL DEFAULT 'PENDING',
            sync_retries INTEGER NOT NULL DEFAULT 0,
            synced_at INTEGER,
            created_at INTEGER NOT NULL
        )",
        // Every sync pass queries one status in creation order
        "CREATE INDEX IF NOT EXISTS idx_submissions_status_created
            ON submissions(sync_status, created_at)",
        // Per-question answers for an attempt
        "CREATE TABLE IF NOT EXISTS answers (
            submission_id TEXT NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
            question_id TEXT NOT NULL,
            selected_answers TEXT NOT NULL,
            is_correct INTEGER NOT NULL DEFAULT 0,
            order_index INTEGER NOT NULL,
            PRIMARY KEY (submission_id, order_index)
        )",
        "CREATE INDEX IF NOT EXISTS idx_answers_submission ON answers(submission_id)",
        // Record migration version
        "INSERT INTO schema_version (version) VALUES (1)",
    ];

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
