//! Video submission endpoint.
//!
//! Accepts a multipart upload, spools the body to a temp file while
//! enforcing the size ceiling, stores the blob and metadata snapshot, writes
//! the canonical record, then enqueues the processing job. Validation runs
//! before any storage I/O; a rejected upload leaves nothing behind.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use vflow_models::upload::{content_type_or_default, validate_extension, UploadValidationError};
use vflow_models::{MetadataSnapshot, VideoId, VideoRecord, MAX_UPLOAD_BYTES};
use vflow_queue::Job;
use vflow_storage::{metadata_key, video_key};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A multipart field spooled to disk.
struct SpooledUpload {
    filename: String,
    extension: String,
    content_type: String,
    size_bytes: u64,
    file: tempfile::NamedTempFile,
}

/// Read the `file` field into a temp file, enforcing the size ceiling while
/// streaming so an oversized body is rejected without buffering it all.
async fn spool_file_field(multipart: &mut Multipart) -> ApiResult<SpooledUpload> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("No file provided"))?;

        // Extension check first, before any bytes are read.
        let extension = validate_extension(&filename)?;

        let content_type = content_type_or_default(field.content_type());

        let temp = tempfile::NamedTempFile::new()
            .map_err(|e| ApiError::internal(format!("temp file failed: {e}")))?;
        let mut writer = tokio::fs::File::create(temp.path())
            .await
            .map_err(|e| ApiError::internal(format!("temp file failed: {e}")))?;

        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::bad_request(format!("Upload interrupted: {e}")))?
        {
            size_bytes += chunk.len() as u64;
            if size_bytes > MAX_UPLOAD_BYTES {
                return Err(UploadValidationError::TooLarge {
                    size: size_bytes,
                    limit: MAX_UPLOAD_BYTES,
                }
                .into());
            }
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ApiError::internal(format!("temp write failed: {e}")))?;
        }
        writer
            .flush()
            .await
            .map_err(|e| ApiError::internal(format!("temp write failed: {e}")))?;

        return Ok(SpooledUpload {
            filename,
            extension,
            content_type,
            size_bytes,
            file: temp,
        });
    }

    Err(ApiError::bad_request("No file provided"))
}

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let spooled = spool_file_field(&mut multipart).await?;

    let video_id = VideoId::new();
    let video_key = video_key(video_id.as_str(), &spooled.extension);
    let metadata_key = metadata_key(video_id.as_str());

    info!(
        video_id = %video_id,
        filename = %spooled.filename,
        size_bytes = spooled.size_bytes,
        "Accepted upload"
    );

    state
        .storage
        .put_file(spooled.file.path(), &video_key, &spooled.content_type)
        .await?;

    let record = VideoRecord::new_uploaded(
        video_id.clone(),
        &spooled.filename,
        state.storage.bucket(),
        &video_key,
        spooled.size_bytes as i64,
    );
    state.repo.insert_uploaded(&record).await?;

    // The snapshot mirrors the canonical record into the object store for
    // legacy readers. Best-effort: the database row is authoritative.
    let snapshot = MetadataSnapshot::from_record(&record);
    if let Err(e) = state
        .storage
        .put_bytes(snapshot.to_json_bytes(), &metadata_key, "application/json")
        .await
    {
        warn!(video_id = %video_id, "Failed to write metadata snapshot: {}", e);
    }

    // Enqueue failure does not roll the upload back; the video stays
    // `UPLOADED` and can be re-enqueued by an operator.
    let job = Job::new(
        video_id.clone(),
        state.storage.bucket(),
        &video_key,
        &metadata_key,
        &spooled.filename,
    );
    if let Err(e) = state.queue.enqueue(&job).await {
        error!(video_id = %video_id, "Failed to enqueue processing job: {}", e);
    }

    metrics::counter!("vflow_api_uploads_total").increment(1);

    Ok(Json(json!({
        "status": "success",
        "video_id": video_id,
        "filename": spooled.filename,
        "size_bytes": spooled.size_bytes,
    })))
}
