use attest_media::MediaError;
use attest_store::StoreError;
use thiserror::Error;

/// Faults outside the extractors. Any of these fails the attempt.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("task error: {0}")]
    Task(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(e: tokio::task::JoinError) -> Self {
        PipelineError::Task(e.to_string())
    }
}
