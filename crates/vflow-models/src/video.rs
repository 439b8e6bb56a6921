//! Video metadata models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video lifecycle status.
///
/// Wire form matches the values persisted by earlier deployments
/// (`UPLOADED` / `PROCESSED` / `FAILED`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    /// Blob stored, processing job enqueued
    #[default]
    Uploaded,
    /// Processing pipeline completed
    Processed,
    /// Processing permanently failed
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "UPLOADED",
            VideoStatus::Processed => "PROCESSED",
            VideoStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOADED" => Ok(VideoStatus::Uploaded),
            "PROCESSED" => Ok(VideoStatus::Processed),
            "FAILED" => Ok(VideoStatus::Failed),
            other => Err(format!("unknown video status: {other}")),
        }
    }
}

/// Canonical video metadata record.
///
/// Created by the submission endpoint with status `UPLOADED` and zeroed
/// counters; mutated by the processing worker (status transition) and by the
/// engagement recorder (counters only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique video ID
    pub video_id: VideoId,

    /// Original filename as uploaded
    pub filename: String,

    /// Object-store bucket holding the blob pair
    pub bucket: String,

    /// Object key of the video blob
    pub video_key: String,

    /// Object key of the thumbnail, set by the worker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,

    /// Blob size in bytes
    pub size_bytes: i64,

    /// Estimated duration in seconds, set by the worker
    #[serde(default)]
    pub duration_seconds: f64,

    /// Lifecycle status
    #[serde(default)]
    pub status: VideoStatus,

    /// View counter
    #[serde(default)]
    pub views: i64,

    /// Like counter
    #[serde(default)]
    pub likes: i64,

    /// Aggregate counter (views + likes)
    #[serde(default)]
    pub engagement: i64,

    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,

    /// Completion timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a new record in the `UPLOADED` state with zeroed counters.
    pub fn new_uploaded(
        video_id: VideoId,
        filename: impl Into<String>,
        bucket: impl Into<String>,
        video_key: impl Into<String>,
        size_bytes: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            video_id,
            filename: filename.into(),
            bucket: bucket.into(),
            video_key: video_key.into(),
            thumbnail_key: None,
            size_bytes,
            duration_seconds: 0.0,
            status: VideoStatus::Uploaded,
            views: 0,
            likes: 0,
            engagement: 0,
            uploaded_at: now,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark as processed. Keeps the first completion timestamp when the
    /// record was already processed (re-delivery must not regress state).
    pub fn processed(mut self, thumbnail_key: impl Into<String>, duration_seconds: f64) -> Self {
        self.status = VideoStatus::Processed;
        self.thumbnail_key = Some(thumbnail_key.into());
        self.duration_seconds = duration_seconds;
        if self.processed_at.is_none() {
            self.processed_at = Some(Utc::now());
        }
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_generation_is_unique() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
        assert!(!id1.is_blank());
    }

    #[test]
    fn status_wire_form_is_screaming_snake() {
        let json = serde_json::to_string(&VideoStatus::Uploaded).unwrap();
        assert_eq!(json, "\"UPLOADED\"");
        let parsed: VideoStatus = serde_json::from_str("\"PROCESSED\"").unwrap();
        assert_eq!(parsed, VideoStatus::Processed);
        assert_eq!("FAILED".parse::<VideoStatus>().unwrap(), VideoStatus::Failed);
    }

    #[test]
    fn new_uploaded_record_has_zeroed_counters() {
        let id = VideoId::new();
        let record = VideoRecord::new_uploaded(
            id.clone(),
            "clip.mp4",
            "video-uploads",
            format!("videos/{id}.mp4"),
            10_485_760,
        );

        assert_eq!(record.status, VideoStatus::Uploaded);
        assert_eq!(record.views, 0);
        assert_eq!(record.likes, 0);
        assert_eq!(record.engagement, 0);
        assert!(record.thumbnail_key.is_none());
        assert!(record.processed_at.is_none());
    }

    #[test]
    fn processed_transition_keeps_first_completion_time() {
        let record = VideoRecord::new_uploaded(VideoId::new(), "a.mp4", "b", "videos/a.mp4", 1)
            .processed("thumbnails/a.png", 12.0);
        let first = record.processed_at;
        assert!(first.is_some());

        let again = record.processed("thumbnails/a.png", 12.0);
        assert_eq!(again.processed_at, first);
        assert_eq!(again.status, VideoStatus::Processed);
    }
}
