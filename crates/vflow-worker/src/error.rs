//! Worker error types.
//!
//! The distinction that matters here is permanence. Permanent errors
//! (malformed payloads, source objects that no longer exist) are dropped
//! without retrying; everything else is retried with backoff and
//! dead-lettered once attempts run out.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Malformed job payload: {0}")]
    MalformedJob(String),

    #[error("Source object missing: {0}")]
    SourceMissing(String),

    #[error("Job timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] vflow_storage::StorageError),

    #[error("Database error: {0}")]
    Db(#[from] vflow_db::DbError),

    #[error("Queue error: {0}")]
    Queue(#[from] vflow_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedJob(msg.into())
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }

    /// Permanent errors are acked and dropped; retrying cannot fix them.
    pub fn is_permanent(&self) -> bool {
        matches!(self, WorkerError::MalformedJob(_) | WorkerError::SourceMissing(_))
    }

    pub fn is_retryable(&self) -> bool {
        !self.is_permanent()
    }
}
