//! S3 object-store client for the VidFlow backend.
//!
//! Wraps the AWS SDK behind the small contract the pipeline needs:
//! put (file or bytes), get, head (existence + size), list-by-prefix.
//! Works against real S3 or an S3-compatible endpoint (LocalStack, MinIO)
//! via `AWS_ENDPOINT_URL`.

mod client;
mod error;

pub use client::{ObjectInfo, ObjectStore, StorageConfig};
pub use error::{StorageError, StorageResult};

/// Object key for a video blob.
pub fn video_key(video_id: &str, extension: &str) -> String {
    format!("videos/{video_id}.{extension}")
}

/// Object key for the metadata JSON snapshot.
pub fn metadata_key(video_id: &str) -> String {
    format!("metadata/{video_id}.json")
}

/// Object key for a thumbnail image.
pub fn thumbnail_key(video_id: &str) -> String {
    format!("thumbnails/{video_id}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout_is_deterministic() {
        assert_eq!(video_key("abc", "mp4"), "videos/abc.mp4");
        assert_eq!(metadata_key("abc"), "metadata/abc.json");
        assert_eq!(thumbnail_key("abc"), "thumbnails/abc.png");
    }
}
