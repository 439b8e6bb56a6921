//! Upload validation rules.
//!
//! Validation happens before any storage I/O: a rejected upload must not
//! leave a blob or metadata record behind.

use thiserror::Error;

/// Maximum accepted upload size (500 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Video container extensions accepted by the submission endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v"];

/// Content type assumed when the client does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadValidationError {
    #[error("Filename has no extension: {0}")]
    MissingExtension(String),

    #[error("File type not allowed: .{0}")]
    UnsupportedExtension(String),

    #[error("Maximum file size is {limit} bytes. File size: {size} bytes.")]
    TooLarge { size: u64, limit: u64 },
}

impl UploadValidationError {
    /// Returns true for the size-ceiling violation (maps to HTTP 413).
    pub fn is_too_large(&self) -> bool {
        matches!(self, UploadValidationError::TooLarge { .. })
    }
}

/// Validate a filename against the extension allow-list.
///
/// Returns the lowercased extension on success.
pub fn validate_extension(filename: &str) -> Result<String, UploadValidationError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| UploadValidationError::MissingExtension(filename.to_string()))?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(UploadValidationError::UnsupportedExtension(ext))
    }
}

/// Enforce the upload size ceiling.
pub fn validate_size(size: u64) -> Result<(), UploadValidationError> {
    if size > MAX_UPLOAD_BYTES {
        Err(UploadValidationError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        })
    } else {
        Ok(())
    }
}

/// Resolve the effective content type for a stored blob.
pub fn content_type_or_default(declared: Option<&str>) -> String {
    declared
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_video_containers() {
        assert_eq!(validate_extension("clip.mp4").unwrap(), "mp4");
        assert_eq!(validate_extension("CLIP.MOV").unwrap(), "mov");
        assert_eq!(validate_extension("a.b.webm").unwrap(), "webm");
    }

    #[test]
    fn rejects_disallowed_extension() {
        assert_eq!(
            validate_extension("doc.pdf"),
            Err(UploadValidationError::UnsupportedExtension("pdf".into()))
        );
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(matches!(
            validate_extension("noext"),
            Err(UploadValidationError::MissingExtension(_))
        ));
        assert!(matches!(
            validate_extension("trailingdot."),
            Err(UploadValidationError::MissingExtension(_))
        ));
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(validate_size(MAX_UPLOAD_BYTES).is_ok());
        let err = validate_size(MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(err.is_too_large());
    }

    #[test]
    fn content_type_defaults_to_mp4() {
        assert_eq!(content_type_or_default(None), "video/mp4");
        assert_eq!(content_type_or_default(Some("")), "video/mp4");
        assert_eq!(
            content_type_or_default(Some("video/webm")),
            "video/webm"
        );
    }
}
