//! Video processing worker.
//!
//! Consumes processing jobs from the Redis Streams queue, simulates the
//! transcode, renders a thumbnail, and transitions the canonical record to
//! `PROCESSED`. Retries live here, in-process with exponential backoff;
//! queue redelivery only covers workers that crashed mid-job.

pub mod config;
pub mod error;
pub mod executor;
pub mod health;
pub mod processor;
pub mod retry;
pub mod thumbnail;
pub mod transcode;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use processor::{JobOutcome, ProcessingContext};
