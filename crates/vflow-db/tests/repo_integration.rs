//! Repository integration tests. Run with `--ignored` against a live
//! Postgres pointed at by `DATABASE_URL`.

use vflow_db::{connect, DbConfig, EngagementKind, VideoRepo};
use vflow_models::{VideoId, VideoRecord, VideoStatus};

async fn repo() -> VideoRepo {
    dotenvy::dotenv().ok();
    let pool = connect(&DbConfig::from_env())
        .await
        .expect("Failed to connect");
    VideoRepo::new(pool)
}

fn sample_record() -> VideoRecord {
    let id = VideoId::new();
    VideoRecord::new_uploaded(
        id.clone(),
        "clip.mp4",
        "video-analytics-uploads",
        format!("videos/{id}.mp4"),
        10_485_760,
    )
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn insert_and_get_round_trip() {
    let repo = repo().await;
    let record = sample_record();

    repo.insert_uploaded(&record).await.expect("insert failed");

    let fetched = repo
        .get(&record.video_id)
        .await
        .expect("get failed")
        .expect("record missing");
    assert_eq!(fetched.status, VideoStatus::Uploaded);
    assert_eq!(fetched.size_bytes, record.size_bytes);
    assert_eq!(fetched.views, 0);
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn mark_processed_is_idempotent_and_preserves_counters() {
    let repo = repo().await;
    let record = sample_record();
    repo.insert_uploaded(&record).await.expect("insert failed");

    // Counter hits arriving before processing completes must survive it.
    repo.record_engagement(&record.video_id, EngagementKind::View, None)
        .await
        .expect("engagement failed");

    let thumb = format!("thumbnails/{}.png", record.video_id);
    let first = repo
        .mark_processed(&record.video_id, &thumb, 42.0, record.size_bytes)
        .await
        .expect("mark_processed failed");
    assert_eq!(first.status, VideoStatus::Processed);
    assert_eq!(first.views, 1);
    let first_at = first.processed_at.expect("processed_at unset");

    // Redelivery: a second transition keeps the original completion time.
    let second = repo
        .mark_processed(&record.video_id, &thumb, 42.0, record.size_bytes)
        .await
        .expect("second mark_processed failed");
    assert_eq!(second.processed_at, Some(first_at));
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn concurrent_engagement_loses_no_updates() {
    let repo = repo().await;
    let record = sample_record();
    repo.insert_uploaded(&record).await.expect("insert failed");

    let mut handles = Vec::new();
    for _ in 0..20 {
        let repo = repo.clone();
        let id = record.video_id.clone();
        handles.push(tokio::spawn(async move {
            repo.record_engagement(&id, EngagementKind::View, None).await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("engagement failed");
    }

    let fetched = repo
        .get(&record.video_id)
        .await
        .expect("get failed")
        .expect("record missing");
    assert_eq!(fetched.views, 20);
    assert_eq!(fetched.engagement, 20);
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn mark_failed_is_terminal_and_counted() {
    let repo = repo().await;
    let record = sample_record();
    repo.insert_uploaded(&record).await.expect("insert failed");

    repo.mark_failed(&record.video_id)
        .await
        .expect("mark_failed failed");

    let fetched = repo
        .get(&record.video_id)
        .await
        .expect("get failed")
        .expect("record missing");
    assert_eq!(fetched.status, VideoStatus::Failed);

    let summary = repo.stats().await.expect("stats failed");
    assert!(summary.failed >= 1);
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn engagement_on_missing_record_is_not_found() {
    let repo = repo().await;
    let err = repo
        .record_engagement(&VideoId::new(), EngagementKind::Like, None)
        .await
        .expect_err("expected NotFound");
    assert!(err.is_not_found());
}
