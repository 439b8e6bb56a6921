//! Shared data models for the VidFlow backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video identifiers, statuses and metadata records
//! - Upload validation rules (extension allow-list, size ceiling)
//! - The legacy-alias JSON snapshot codec for object-store metadata

pub mod snapshot;
pub mod upload;
pub mod video;

// Re-export common types
pub use snapshot::MetadataSnapshot;
pub use upload::{UploadValidationError, MAX_UPLOAD_BYTES};
pub use video::{VideoId, VideoRecord, VideoStatus};
