//! Queue integration tests. Run with `--ignored` against a live Redis.

use vflow_models::VideoId;
use vflow_queue::{Job, JobQueue};

fn sample_job(tag: &str) -> Job {
    let id = VideoId::new();
    Job::new(
        id.clone(),
        "video-analytics-uploads",
        format!("videos/{id}.mp4"),
        format!("metadata/{id}.json"),
        format!("{tag}.mp4"),
    )
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn connection_and_length() {
    dotenvy::dotenv().ok();

    let queue = JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    queue.len().await.expect("Failed to get queue length");
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn enqueue_receive_ack_cycle() {
    dotenvy::dotenv().ok();

    let queue = JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let job = sample_job("cycle");
    let video_id = job.video_id.clone();

    queue.enqueue(&job).await.expect("Failed to enqueue");

    let jobs = queue
        .receive("test-consumer", 1000, 1)
        .await
        .expect("Failed to receive");
    assert_eq!(jobs.len(), 1);

    let (message_id, received) = &jobs[0];
    assert_eq!(received.video_id, video_id);

    queue.ack(message_id).await.expect("Failed to ack");
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn dead_letter_moves_and_acks() {
    dotenvy::dotenv().ok();

    let queue = JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let job = sample_job("dlq");
    queue.enqueue(&job).await.expect("Failed to enqueue");

    let jobs = queue
        .receive("test-dlq-consumer", 1000, 1)
        .await
        .expect("Failed to receive");
    assert!(!jobs.is_empty());
    let (message_id, received) = &jobs[0];

    let dlq_before = queue.dlq_len().await.expect("Failed to get DLQ length");
    queue
        .dead_letter(message_id, received, "simulated exhausted retries")
        .await
        .expect("Failed to dead-letter");

    let dlq_after = queue.dlq_len().await.expect("Failed to get DLQ length");
    assert!(dlq_after > dlq_before);

    // Dead-lettering acked the original, so nothing redelivers.
    let redelivered = queue
        .claim_pending("test-dlq-consumer-2", 10, queue.visibility_timeout())
        .await
        .expect("Failed to claim");
    assert!(redelivered.iter().all(|(id, _)| id != message_id));
}
