//! Route table and middleware stack.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{engagement, health, upload, videos};
use crate::middleware;
use crate::state::AppState;

pub fn build_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let max_body = state.config.max_body_bytes;
    let cors = middleware::cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        )
        .route("/upload", post(upload::upload))
        .route("/videos", get(videos::list))
        .route("/video/:video_id", get(videos::get))
        .route("/view/:video_id", post(engagement::view))
        .route("/like/:video_id", post(engagement::like))
        .route("/stats", get(videos::stats))
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}
