//! Worker health and metrics endpoint.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use tracing::info;

#[derive(Clone)]
struct HealthState {
    running: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

async fn health(State(state): State<HealthState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "worker_running": state.running.load(Ordering::SeqCst),
    }))
}

async fn metrics(State(state): State<HealthState>) -> String {
    state.metrics.render()
}

/// Serve `/health` and `/metrics` until the process exits.
pub async fn serve(
    port: u16,
    running: Arc<AtomicBool>,
    metrics_handle: PrometheusHandle,
) -> std::io::Result<()> {
    let state = HealthState {
        running,
        metrics: metrics_handle,
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Health endpoint listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
