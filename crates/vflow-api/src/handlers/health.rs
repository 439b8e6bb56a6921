//! Health and metrics endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /health
///
/// Probes every dependency; reports degraded (still 200, load balancers use
/// /health/ready for gating) with per-component status.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let db = component_status("database", state.repo.ping().await.err());
    let storage = component_status("storage", state.storage.check_connectivity().await.err());
    let queue = component_status("queue", state.queue.len().await.err());

    let healthy = [&db, &storage, &queue].iter().all(|s| *s == &"healthy");

    Json(json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "components": {
            "database": db,
            "storage": storage,
            "queue": queue,
        },
    }))
}

/// GET /health/ready
///
/// 503 until every dependency answers; used as the readiness gate.
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    if state.repo.ping().await.is_err()
        || state.storage.check_connectivity().await.is_err()
        || state.queue.len().await.is_err()
    {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({ "status": "ready" })))
}

fn component_status<E: std::fmt::Display>(name: &str, error: Option<E>) -> &'static str {
    match error {
        None => "healthy",
        Some(e) => {
            warn!("Health probe failed for {}: {}", name, e);
            "unhealthy"
        }
    }
}
