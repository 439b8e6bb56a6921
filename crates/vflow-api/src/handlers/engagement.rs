//! Engagement recording endpoints.
//!
//! Each hit is a single atomic counter increment in the metadata store, so
//! concurrent viewers never lose updates. Responses carry the new totals.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use vflow_db::EngagementKind;
use vflow_models::VideoId;

use crate::error::ApiResult;
use crate::middleware::client_ip;
use crate::state::AppState;

async fn record(
    state: &AppState,
    video_id: String,
    kind: EngagementKind,
    headers: &HeaderMap,
) -> ApiResult<Json<Value>> {
    let video_id = VideoId::from_string(video_id);
    let ip = client_ip(headers);

    let totals = state
        .repo
        .record_engagement(&video_id, kind, ip.as_deref())
        .await?;

    metrics::counter!("vflow_api_engagement_total", "kind" => kind.as_str()).increment(1);

    Ok(Json(json!({
        "video_id": video_id,
        "views": totals.views,
        "likes": totals.likes,
        "engagement": totals.engagement,
    })))
}

/// POST /view/:video_id
pub async fn view(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    record(&state, video_id, EngagementKind::View, &headers).await
}

/// POST /like/:video_id
pub async fn like(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    record(&state, video_id, EngagementKind::Like, &headers).await
}
