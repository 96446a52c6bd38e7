use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] prepdeck_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No access token available. Set PREPDECK_ACCESS_TOKEN to sync.")]
    MissingAccessToken,
    #[error("Refusing to reset without --yes")]
    ResetNotConfirmed,
    #[error("Could not determine a data directory; pass --db-path")]
    NoDataDir,
}
