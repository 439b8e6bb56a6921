//! Job processing pipeline.
//!
//! One job walks through: source existence check, simulated transcode,
//! thumbnail render and upload, record transition to `PROCESSED`, then a
//! best-effort refresh of the object-store metadata snapshot. The record
//! transition is the durability point; everything after it only logs on
//! failure.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use vflow_db::{connect, DbConfig, VideoRepo};
use vflow_models::snapshot::MetadataSnapshot;
use vflow_queue::Job;
use vflow_storage::ObjectStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::retry::{retry_with_backoff, RetryConfig, RetryResult};
use crate::{thumbnail, transcode};

/// Shared clients and configuration for job processing.
///
/// Built once at startup; every job borrows the same pooled connections
/// instead of constructing clients per message.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub storage: ObjectStore,
    pub repo: VideoRepo,
    retry: RetryConfig,
}

impl ProcessingContext {
    pub async fn new(config: WorkerConfig) -> WorkerResult<Self> {
        let storage = ObjectStore::from_env().await?;
        let pool = connect(&DbConfig::from_env()).await?;
        let retry = RetryConfig::from_worker_config(&config);

        Ok(Self {
            config,
            storage,
            repo: VideoRepo::new(pool),
            retry,
        })
    }
}

/// Outcome of one job delivery, after the retry loop has run.
#[derive(Debug)]
pub enum JobOutcome {
    Completed,
    /// Dropped without retrying; the error can never succeed.
    DroppedPermanent(WorkerError),
    /// Retries exhausted; caller dead-letters the message.
    Exhausted { error: WorkerError, attempts: u32 },
}

/// Process one job delivery end to end, retrying transient failures
/// in-process with backoff.
#[instrument(skip(ctx, job), fields(video_id = %job.video_id, correlation_id = %correlation_id))]
pub async fn process_job(ctx: &Arc<ProcessingContext>, job: &Job, correlation_id: Uuid) -> JobOutcome {
    if job.is_malformed() {
        return JobOutcome::DroppedPermanent(WorkerError::malformed(format!(
            "job for '{}' has no usable video id or key",
            job.original_filename
        )));
    }

    info!(filename = %job.original_filename, "Processing job");

    let result = retry_with_backoff(&ctx.retry, |attempt| {
        let ctx = Arc::clone(ctx);
        let job = job.clone();
        async move {
            if attempt > 0 {
                info!(attempt, "Retrying job");
            }
            process_attempt(&ctx, &job).await
        }
    })
    .await;

    match result {
        RetryResult::Success(()) => JobOutcome::Completed,
        RetryResult::Failed { error, attempts: _ } if error.is_permanent() => {
            JobOutcome::DroppedPermanent(error)
        }
        RetryResult::Failed { error, attempts } => JobOutcome::Exhausted { error, attempts },
    }
}

/// One attempt: existence check, then the timed transform.
async fn process_attempt(ctx: &ProcessingContext, job: &Job) -> WorkerResult<()> {
    // Head inside the retried span so a flaky head is retried, while a
    // definite 404 is permanent.
    let size_bytes = match ctx.storage.head(&job.video_key).await {
        Ok(size) => size,
        Err(e) if e.is_not_found() => {
            return Err(WorkerError::SourceMissing(job.video_key.clone()));
        }
        Err(e) => return Err(e.into()),
    };

    let timeout = ctx.config.job_timeout;
    match tokio::time::timeout(timeout, transform_and_persist(ctx, job, size_bytes)).await {
        Ok(result) => result,
        Err(_) => Err(WorkerError::Timeout { seconds: timeout.as_secs() }),
    }
}

async fn transform_and_persist(
    ctx: &ProcessingContext,
    job: &Job,
    size_bytes: u64,
) -> WorkerResult<()> {
    transcode::simulate(ctx.config.transcode_delay).await;
    let duration_seconds = transcode::estimate_duration_seconds(size_bytes);

    let thumbnail_key = upload_thumbnail(ctx, job).await;

    let record = ctx
        .repo
        .mark_processed(
            &job.video_id,
            &thumbnail_key,
            duration_seconds,
            size_bytes as i64,
        )
        .await?;

    // Snapshot refresh is best-effort; the record above is authoritative.
    let snapshot = MetadataSnapshot::from_record(&record);
    if let Err(e) = ctx
        .storage
        .put_bytes(snapshot.to_json_bytes(), &job.metadata_key, "application/json")
        .await
    {
        warn!(key = %job.metadata_key, "Failed to refresh metadata snapshot: {}", e);
    }

    info!(
        duration_seconds,
        size_bytes,
        thumbnail_key = %thumbnail_key,
        "Job completed"
    );
    Ok(())
}

/// Render and upload the thumbnail. Failures degrade to the shared
/// placeholder key rather than failing the job.
async fn upload_thumbnail(ctx: &ProcessingContext, job: &Job) -> String {
    let key = vflow_storage::thumbnail_key(job.video_id.as_str());

    let png = match thumbnail::render_png(&job.video_id) {
        Ok(png) => png,
        Err(e) => {
            warn!(video_id = %job.video_id, "Thumbnail render failed: {}", e);
            return thumbnail::PLACEHOLDER_KEY.to_string();
        }
    };

    match ctx.storage.put_bytes(png, &key, "image/png").await {
        Ok(()) => key,
        Err(e) => {
            warn!(video_id = %job.video_id, "Thumbnail upload failed: {}", e);
            thumbnail::PLACEHOLDER_KEY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vflow_models::VideoId;

    #[test]
    fn malformed_job_is_detected_before_any_io() {
        let job = Job::new(VideoId::from_string(""), "b", "videos/x.mp4", "m", "x.mp4");
        assert!(job.is_malformed());
    }

    #[test]
    fn outcome_debug_is_informative() {
        let outcome = JobOutcome::Exhausted {
            error: WorkerError::processing("still down"),
            attempts: 4,
        };
        let text = format!("{:?}", outcome);
        assert!(text.contains("Exhausted"));
        assert!(text.contains("4"));
    }
}
