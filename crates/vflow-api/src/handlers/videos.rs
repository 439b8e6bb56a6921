//! Video read endpoints.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use vflow_db::StatsSummary;
use vflow_models::{VideoId, VideoRecord, VideoStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// GET /videos
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let status = params
        .status
        .map(|s| {
            VideoStatus::from_str(&s)
                .map_err(|_| ApiError::bad_request(format!("Unknown status: {s}")))
        })
        .transpose()?;

    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let videos: Vec<VideoRecord> = state.repo.list(status, limit).await?;

    Ok(Json(json!({
        "count": videos.len(),
        "videos": videos,
    })))
}

/// GET /video/:video_id
pub async fn get(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = VideoId::from_string(video_id);
    let record = state
        .repo
        .get(&video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(Json(record))
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsSummary>> {
    let summary = state.repo.stats().await?;
    Ok(Json(summary))
}
