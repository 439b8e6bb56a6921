//! Object-store metadata snapshot codec.
//!
//! The canonical record lives in the relational store; a JSON snapshot is
//! additionally written next to the video blob (`metadata/{id}.json`) for
//! compatibility with the object-store layout of earlier deployments. Those
//! deployments duplicated several fields under legacy names
//! (`filename`/`original_filename`, `size`/`file_size`,
//! `timestamp`/`upload_timestamp`). The aliases exist only here, at the
//! serialization boundary; business logic sees the canonical names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::video::{VideoId, VideoRecord, VideoStatus};

/// Snapshot form of a video record.
///
/// Deserialization accepts both canonical and legacy field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataSnapshot {
    pub video_id: VideoId,

    #[serde(alias = "original_filename")]
    pub filename: String,

    #[serde(alias = "file_size", default)]
    pub size: i64,

    #[serde(rename = "s3_bucket")]
    pub bucket: String,

    #[serde(rename = "s3_video_key", alias = "s3_key")]
    pub video_key: String,

    #[serde(rename = "s3_thumbnail_key", default)]
    pub thumbnail_key: Option<String>,

    #[serde(alias = "runtime", default)]
    pub duration_seconds: f64,

    #[serde(default)]
    pub status: VideoStatus,

    #[serde(default)]
    pub views: i64,

    #[serde(default)]
    pub likes: i64,

    #[serde(default)]
    pub engagement: i64,

    /// Upload time as epoch seconds, the form legacy readers expect.
    #[serde(alias = "upload_timestamp")]
    pub timestamp: i64,
}

impl MetadataSnapshot {
    /// Build a snapshot from the canonical record.
    pub fn from_record(record: &VideoRecord) -> Self {
        Self {
            video_id: record.video_id.clone(),
            filename: record.filename.clone(),
            size: record.size_bytes,
            bucket: record.bucket.clone(),
            video_key: record.video_key.clone(),
            thumbnail_key: record.thumbnail_key.clone(),
            duration_seconds: record.duration_seconds,
            status: record.status,
            views: record.views,
            likes: record.likes,
            engagement: record.engagement,
            timestamp: record.uploaded_at.timestamp(),
        }
    }

    /// Parse a snapshot, tolerating legacy alias keys.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serialize with the duplicate legacy keys emitted alongside the
    /// canonical ones, matching what existing stored objects look like.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        let value = json!({
            "video_id": self.video_id,
            "filename": self.filename,
            "original_filename": self.filename,
            "size": self.size,
            "file_size": self.size,
            "s3_bucket": self.bucket,
            "s3_key": self.video_key,
            "s3_video_key": self.video_key,
            "s3_thumbnail_key": self.thumbnail_key,
            "runtime": self.duration_seconds,
            "duration_seconds": self.duration_seconds,
            "status": self.status,
            "views": self.views,
            "likes": self.likes,
            "engagement": self.engagement,
            "timestamp": self.timestamp,
            "upload_timestamp": self.timestamp,
        });
        // json! on plain serializable fields cannot fail to re-serialize
        serde_json::to_vec_pretty(&value).unwrap_or_default()
    }

    /// Convert into the canonical record form.
    pub fn into_record(self) -> VideoRecord {
        let uploaded_at = DateTime::<Utc>::from_timestamp(self.timestamp, 0).unwrap_or_else(Utc::now);
        VideoRecord {
            video_id: self.video_id,
            filename: self.filename,
            bucket: self.bucket,
            video_key: self.video_key,
            thumbnail_key: self.thumbnail_key,
            size_bytes: self.size,
            duration_seconds: self.duration_seconds,
            status: self.status,
            views: self.views,
            likes: self.likes,
            engagement: self.engagement,
            uploaded_at,
            processed_at: None,
            created_at: uploaded_at,
            updated_at: uploaded_at,
        }
    }

    /// Raw JSON value with alias keys, for callers that post-process.
    pub fn to_value(&self) -> Value {
        serde_json::from_slice(&self.to_json_bytes()).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> VideoRecord {
        VideoRecord::new_uploaded(
            VideoId::from_string("vid-1"),
            "clip.mp4",
            "video-uploads",
            "videos/vid-1.mp4",
            10_485_760,
        )
    }

    #[test]
    fn emits_legacy_alias_keys() {
        let snapshot = MetadataSnapshot::from_record(&sample_record());
        let value = snapshot.to_value();

        assert_eq!(value["filename"], value["original_filename"]);
        assert_eq!(value["size"], value["file_size"]);
        assert_eq!(value["timestamp"], value["upload_timestamp"]);
        assert_eq!(value["s3_key"], value["s3_video_key"]);
        assert_eq!(value["status"], "UPLOADED");
    }

    #[test]
    fn parses_legacy_only_keys() {
        let legacy = serde_json::json!({
            "video_id": "vid-2",
            "original_filename": "old.mov",
            "file_size": 42,
            "s3_bucket": "video-uploads",
            "s3_key": "videos/vid-2.mov",
            "upload_timestamp": 1700000000,
            "runtime": 7.5,
            "status": "PROCESSED",
        });

        let snapshot = MetadataSnapshot::parse(legacy.to_string().as_bytes()).unwrap();
        assert_eq!(snapshot.filename, "old.mov");
        assert_eq!(snapshot.size, 42);
        assert_eq!(snapshot.video_key, "videos/vid-2.mov");
        assert_eq!(snapshot.timestamp, 1_700_000_000);
        assert_eq!(snapshot.duration_seconds, 7.5);
        assert_eq!(snapshot.status, VideoStatus::Processed);
    }

    #[test]
    fn round_trips_through_bytes() {
        let snapshot = MetadataSnapshot::from_record(&sample_record());
        let parsed = MetadataSnapshot::parse(&snapshot.to_json_bytes()).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn into_record_preserves_counters() {
        let mut snapshot = MetadataSnapshot::from_record(&sample_record());
        snapshot.views = 3;
        snapshot.likes = 2;
        snapshot.engagement = 5;

        let record = snapshot.into_record();
        assert_eq!(record.views, 3);
        assert_eq!(record.likes, 2);
        assert_eq!(record.engagement, 5);
    }
}
