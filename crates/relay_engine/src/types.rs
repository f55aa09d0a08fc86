use std::io;

use relay_core::RunState;
use thiserror::Error;

use crate::staging::StagingError;

pub type ChatId = i64;
pub type MessageId = i64;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("could not locate file {file_id}: {message}")]
    Lookup { file_id: String, message: String },
    #[error("download failed with http status {0}")]
    HttpStatus(u16),
    #[error("download timed out")]
    Timeout,
    #[error("download failed: {0}")]
    Network(String),
    #[error("file too large (max {max_bytes} bytes, got {actual})")]
    TooLarge { max_bytes: u64, actual: u64 },
    #[error("failed to write staged file: {0}")]
    Write(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Telegraph returned http status {0}")]
    HttpStatus(u16),
    #[error("invalid response from Telegraph: {0}")]
    UnexpectedResponse(String),
    #[error("Telegraph rejected the request: {0}")]
    Api(String),
    #[error("Telegraph request timed out")]
    Timeout,
    #[error("Telegraph request failed: {0}")]
    Network(String),
    #[error("failed to read staged file: {0}")]
    Read(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported media type")]
pub struct UnsupportedMediaError;

/// Any failure that ends a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Final state of a run together with the published URL or the failure.
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub result: Result<String, RunError>,
}

impl RunReport {
    pub fn url(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }
}
