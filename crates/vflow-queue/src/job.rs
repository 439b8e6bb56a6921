//! Processing job payload.

use serde::{Deserialize, Serialize};
use vflow_models::VideoId;

/// One unit of processing work referencing an uploaded video.
///
/// Produced exactly once per successful upload; consumed at-least-once.
/// The wire field names (`s3_*`) are fixed by existing producers and
/// consumers; struct fields carry the canonical names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Video this job processes
    pub video_id: VideoId,

    /// Bucket holding the blob pair
    #[serde(rename = "s3_bucket")]
    pub bucket: String,

    /// Object key of the uploaded video blob
    #[serde(rename = "s3_video_key")]
    pub video_key: String,

    /// Object key of the metadata JSON snapshot
    #[serde(rename = "s3_metadata_key")]
    pub metadata_key: String,

    /// Filename as uploaded, for logging
    pub original_filename: String,
}

impl Job {
    pub fn new(
        video_id: VideoId,
        bucket: impl Into<String>,
        video_key: impl Into<String>,
        metadata_key: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        Self {
            video_id,
            bucket: bucket.into(),
            video_key: video_key.into(),
            metadata_key: metadata_key.into(),
            original_filename: original_filename.into(),
        }
    }

    /// A payload without a usable video id can never succeed, no matter how
    /// often it is retried.
    pub fn is_malformed(&self) -> bool {
        self.video_id.is_blank() || self.video_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_s3_field_names() {
        let job = Job::new(
            VideoId::from_string("vid-1"),
            "video-uploads",
            "videos/vid-1.mp4",
            "metadata/vid-1.json",
            "clip.mp4",
        );

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["video_id"], "vid-1");
        assert_eq!(value["s3_bucket"], "video-uploads");
        assert_eq!(value["s3_video_key"], "videos/vid-1.mp4");
        assert_eq!(value["s3_metadata_key"], "metadata/vid-1.json");
        assert_eq!(value["original_filename"], "clip.mp4");
    }

    #[test]
    fn parses_producer_payload() {
        let payload = r#"{
            "video_id": "vid-2",
            "s3_bucket": "video-uploads",
            "s3_video_key": "videos/vid-2.mov",
            "s3_metadata_key": "metadata/vid-2.json",
            "original_filename": "holiday.mov"
        }"#;

        let job: Job = serde_json::from_str(payload).unwrap();
        assert_eq!(job.video_id.as_str(), "vid-2");
        assert_eq!(job.video_key, "videos/vid-2.mov");
        assert!(!job.is_malformed());
    }

    #[test]
    fn blank_video_id_is_malformed() {
        let job = Job::new(VideoId::from_string("  "), "b", "videos/x.mp4", "m", "x.mp4");
        assert!(job.is_malformed());

        let job = Job::new(VideoId::from_string("ok"), "b", "", "m", "x.mp4");
        assert!(job.is_malformed());
    }
}
