use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading an artist profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse profile {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid profile: {0}")]
    Invalid(String),
}

/// Failures of a single search request. Never fatal for a run.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to launch yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("yt-dlp exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("unreadable search output: {0}")]
    Output(String),
}

/// Failures while fetching the audio of one candidate.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to launch yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("yt-dlp exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// A missing binary will not appear between two attempts.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DownloadError::Spawn(_))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
