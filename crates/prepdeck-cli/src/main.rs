//! Prepdeck CLI - inspect and drive the local result sync queue
//!
//! Records finished attempts locally and pushes them to the remote service
//! on demand, mirroring what the app does on foreground/network-restored.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use prepdeck_core::db::{
    AnswerStore, Database, LibSqlAnswerStore, LibSqlSubmissionStore, SubmissionStore,
};
use prepdeck_core::sync::{HttpSubmissionClient, SyncIdentity, SyncProcessor, SyncReport};
use prepdeck_core::{Submission, SyncStatus};
use serde::Serialize;

mod error;

use error::CliError;

const ACCESS_TOKEN_ENV: &str = "PREPDECK_ACCESS_TOKEN";

#[derive(Parser)]
#[command(name = "prepdeck")]
#[command(about = "Record exam attempts locally and sync them to the server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a finished attempt locally (queued for sync)
    Record {
        /// Exam type the attempt was taken against
        exam_type_id: String,
        /// Score in percent (0-100)
        #[arg(long)]
        score: u8,
        /// Whether the attempt passed
        #[arg(long)]
        passed: bool,
        /// Attempt duration in seconds
        #[arg(long, default_value = "0")]
        duration: i64,
        /// Owning user id; unowned attempts stay local-only
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show queue counts by sync status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deliver pending submissions to the remote endpoint
    Sync(RemoteArgs),
    /// Retry failed submissions, waiting out each one's backoff
    Retry(RemoteArgs),
    /// Delete all local submissions and answers
    Reset {
        /// Confirm the purge
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct RemoteArgs {
    /// API base URL (e.g. https://api.prepdeck.app)
    #[arg(long, value_name = "URL")]
    endpoint: String,

    /// Authenticated user id
    #[arg(long, value_name = "ID")]
    owner: String,
}

#[derive(Serialize)]
struct StatusCounts {
    pending: u64,
    synced: u64,
    failed: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let db_path = resolve_db_path(cli.db_path)?;
    tracing::debug!(path = %db_path.display(), "Using local database");
    let db = Database::open(&db_path).await?;
    let submissions = LibSqlSubmissionStore::new(db.connection());
    let answers = LibSqlAnswerStore::new(db.connection());

    match cli.command {
        Commands::Record {
            exam_type_id,
            score,
            passed,
            duration,
            owner,
        } => {
            let mut submission = Submission::new(exam_type_id, score, passed, duration);
            if let Some(owner) = owner {
                submission = submission.with_owner(owner);
            }
            submissions.save(&submission).await?;
            println!("Recorded attempt {}", submission.id);
        }
        Commands::Status { json } => {
            let counts = StatusCounts {
                pending: submissions.count_by_status(SyncStatus::Pending).await?,
                synced: submissions.count_by_status(SyncStatus::Synced).await?,
                failed: submissions.count_by_status(SyncStatus::Failed).await?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                for line in format_status_lines(&counts) {
                    println!("{line}");
                }
            }
        }
        Commands::Sync(remote) => {
            let client = HttpSubmissionClient::new(remote.endpoint)?;
            let processor = SyncProcessor::new(&submissions, &answers, &client);
            let identity = identity_from_env(remote.owner)?;
            let report = processor.sync_pending(Some(&identity)).await?;
            print_report("sync", &report);
        }
        Commands::Retry(remote) => {
            let client = HttpSubmissionClient::new(remote.endpoint)?;
            let processor = SyncProcessor::new(&submissions, &answers, &client);
            let identity = identity_from_env(remote.owner)?;
            let report = processor.retry_failed(Some(&identity)).await?;
            print_report("retry", &report);
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(CliError::ResetNotConfirmed);
            }
            answers.delete_all().await?;
            submissions.delete_all().await?;
            println!("Local submission data deleted");
        }
    }

    Ok(())
}

fn resolve_db_path(db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = db_path {
        return Ok(path);
    }

    let dir = dirs::data_dir().ok_or(CliError::NoDataDir)?.join("prepdeck");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("prepdeck.db"))
}

fn identity_from_env(owner: String) -> Result<SyncIdentity, CliError> {
    let token = env::var(ACCESS_TOKEN_ENV)
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(CliError::MissingAccessToken)?;
    Ok(SyncIdentity::new(owner, token))
}

fn format_status_lines(counts: &StatusCounts) -> Vec<String> {
    vec![
        format!("pending: {}", counts.pending),
        format!("synced:  {}", counts.synced),
        format!("failed:  {}", counts.failed),
    ]
}

fn print_report(pass: &str, report: &SyncReport) {
    println!(
        "{pass}: {} synced, {} failed",
        report.synced, report.failed
    );
    for item in &report.errors {
        println!("  {}: {}", item.id, item.message);
    }
    if !report.success() {
        println!("Failed submissions will be retried later.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_status_lines() {
        let counts = StatusCounts {
            pending: 2,
            synced: 10,
            failed: 1,
        };
        assert_eq!(
            format_status_lines(&counts),
            vec!["pending: 2", "synced:  10", "failed:  1"]
        );
    }

    #[test]
    fn test_cli_parses_record() {
        let cli = Cli::try_parse_from([
            "prepdeck", "record", "exam-aws-saa", "--score", "82", "--passed", "--duration",
            "3600",
        ])
        .unwrap();
        match cli.command {
            Commands::Record { score, passed, .. } => {
                assert_eq!(score, 82);
                assert!(passed);
            }
            _ => panic!("expected record command"),
        }
    }
}
