//! Job execution loop.
//!
//! Pulls message batches from the queue, runs each job on its own task
//! under a concurrency permit, and settles every delivery exactly one of
//! three ways: ack on success, ack-and-drop for permanent errors, or
//! dead-letter (which acks internally) when retries run out. Every exit
//! path acks, so redelivery only ever happens for crashed workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

use vflow_queue::{Job, JobQueue};

use crate::error::WorkerResult;
use crate::processor::{process_job, JobOutcome, ProcessingContext};

const RECEIVE_BLOCK_MS: u64 = 1000;

/// Idle threshold for reclaiming pending messages: whichever is larger of
/// the queue's visibility timeout and this worker's worst-case per-delivery
/// residency.
fn claim_min_idle(config: &crate::config::WorkerConfig, visibility_timeout: Duration) -> Duration {
    config.worst_case_residency().max(visibility_timeout)
}

pub struct JobExecutor {
    queue: Arc<JobQueue>,
    ctx: Arc<ProcessingContext>,
    consumer_name: String,
    semaphore: Arc<Semaphore>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    running: Arc<AtomicBool>,
}

impl JobExecutor {
    pub fn new(queue: JobQueue, ctx: ProcessingContext) -> Self {
        let max_jobs = ctx.config.max_concurrent_jobs;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            queue: Arc::new(queue),
            ctx: Arc::new(ctx),
            consumer_name: format!("worker-{}", Uuid::new_v4()),
            semaphore: Arc::new(Semaphore::new(max_jobs)),
            shutdown_tx,
            shutdown_rx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Liveness flag exposed by the health endpoint.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Request a graceful stop. In-flight jobs finish; no new batches are
    /// pulled.
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.shutdown_tx.send(true).ok();
    }

    /// Run the consume loop until shutdown.
    pub async fn run(&self) -> WorkerResult<()> {
        self.queue.init().await?;
        self.running.store(true, Ordering::SeqCst);

        info!(
            consumer = %self.consumer_name,
            max_concurrent = self.ctx.config.max_concurrent_jobs,
            "Worker started"
        );

        self.spawn_claim_loop();

        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let available = self.semaphore.available_permits();
            if available == 0 {
                // All permits busy; wait for capacity or shutdown.
                tokio::select! {
                    _ = shutdown_rx.changed() => {}
                    _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {}
                }
                continue;
            }

            let want = available.min(self.ctx.config.batch_size);
            let batch = match self.queue.receive(&self.consumer_name, RECEIVE_BLOCK_MS, want).await
            {
                Ok(batch) => batch,
                Err(e) => {
                    error!("Queue receive failed: {}", e);
                    counter!("vflow_worker_queue_errors_total").increment(1);
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    continue;
                }
            };

            for (message_id, job) in batch {
                self.spawn_job(message_id, job).await;
            }
        }

        self.drain().await;
        self.running.store(false, Ordering::SeqCst);
        info!("Worker stopped");
        Ok(())
    }

    /// Periodically claim messages abandoned by crashed workers. The idle
    /// threshold is the worst-case retry residency, never the bare
    /// visibility timeout: a single delivery can legitimately hold a
    /// message for every attempt plus backoff, and reclaiming earlier
    /// would run the same job on two consumers at once.
    fn spawn_claim_loop(&self) {
        let queue = Arc::clone(&self.queue);
        let consumer_name = self.consumer_name.clone();
        let interval = self.ctx.config.claim_interval;
        let batch_size = self.ctx.config.batch_size;
        let min_idle = claim_min_idle(&self.ctx.config, queue.visibility_timeout());
        let mut shutdown_rx = self.shutdown_rx.clone();

        let executor = self.clone_for_tasks();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(interval) => {
                        match queue.claim_pending(&consumer_name, batch_size, min_idle).await {
                            Ok(claimed) => {
                                for (message_id, job) in claimed {
                                    counter!("vflow_worker_jobs_claimed_total").increment(1);
                                    executor.spawn_job(message_id, job).await;
                                }
                            }
                            Err(e) => warn!("Claim sweep failed: {}", e),
                        }

                        if let Ok(len) = queue.len().await {
                            gauge!("vflow_queue_depth").set(len as f64);
                        }
                        if let Ok(len) = queue.dlq_len().await {
                            gauge!("vflow_dlq_depth").set(len as f64);
                        }
                    }
                }
            }
        });
    }

    fn clone_for_tasks(&self) -> ExecutorHandle {
        ExecutorHandle {
            queue: Arc::clone(&self.queue),
            ctx: Arc::clone(&self.ctx),
            semaphore: Arc::clone(&self.semaphore),
        }
    }

    async fn spawn_job(&self, message_id: String, job: Job) {
        self.clone_for_tasks().spawn_job(message_id, job).await;
    }

    /// Wait for all in-flight jobs to finish.
    async fn drain(&self) {
        let total = self.ctx.config.max_concurrent_jobs as u32;
        info!("Draining in-flight jobs");
        // Holding every permit means no job is still running.
        let _all = self.semaphore.acquire_many(total).await;
    }
}

/// The subset of executor state job tasks need.
struct ExecutorHandle {
    queue: Arc<JobQueue>,
    ctx: Arc<ProcessingContext>,
    semaphore: Arc<Semaphore>,
}

impl ExecutorHandle {
    async fn spawn_job(&self, message_id: String, job: Job) {
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return, // Semaphore closed, shutting down
        };

        let queue = Arc::clone(&self.queue);
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            let _permit = permit;
            let correlation_id = Uuid::new_v4();
            let started = Instant::now();

            let outcome = process_job(&ctx, &job, correlation_id).await;
            histogram!("vflow_worker_job_duration_seconds")
                .record(started.elapsed().as_secs_f64());

            match outcome {
                JobOutcome::Completed => {
                    counter!("vflow_worker_jobs_completed_total").increment(1);
                    if let Err(e) = queue.ack(&message_id).await {
                        error!(message_id = %message_id, "Ack failed: {}", e);
                    }
                }
                JobOutcome::DroppedPermanent(error) => {
                    warn!(
                        video_id = %job.video_id,
                        "Dropping job, permanent failure: {}",
                        error
                    );
                    counter!("vflow_worker_jobs_dropped_total").increment(1);
                    if let Err(e) = queue.ack(&message_id).await {
                        error!(message_id = %message_id, "Ack failed: {}", e);
                    }
                }
                JobOutcome::Exhausted { error, attempts } => {
                    error!(
                        video_id = %job.video_id,
                        attempts,
                        "Retries exhausted, dead-lettering: {}",
                        error
                    );
                    counter!("vflow_worker_jobs_dead_lettered_total").increment(1);
                    if let Err(e) = queue
                        .dead_letter(&message_id, &job, &error.to_string())
                        .await
                    {
                        // Ack anyway so a broken DLQ cannot cause infinite
                        // redelivery of a job that already failed its retries.
                        error!(message_id = %message_id, "Dead-letter failed: {}", e);
                        queue.ack(&message_id).await.ok();
                    }
                    // Terminal state for the record; best-effort, the DLQ
                    // entry above is the authoritative escalation.
                    if let Err(e) = ctx.repo.mark_failed(&job.video_id).await {
                        warn!(video_id = %job.video_id, "Failed to mark record FAILED: {}", e);
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use vflow_queue::QueueConfig;

    #[test]
    fn claim_idle_never_undercuts_retry_residency() {
        let config = WorkerConfig::default();
        let visibility = QueueConfig::default().visibility_timeout;

        // A message can be busy for every attempt plus backoff; reclaiming
        // it any earlier would hand it to a second consumer mid-retry.
        let idle = claim_min_idle(&config, visibility);
        assert!(idle >= config.worst_case_residency());
        assert!(idle >= visibility);
    }

    #[test]
    fn claim_idle_keeps_longer_visibility_window() {
        let config = WorkerConfig::default();
        let long_visibility = Duration::from_secs(3600);
        assert_eq!(claim_min_idle(&config, long_visibility), long_visibility);
    }
}
