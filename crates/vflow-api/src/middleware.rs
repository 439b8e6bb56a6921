//! Request middleware: request ids, per-request metrics, CORS.

use std::time::Instant;

use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::metrics::sanitize_path;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Attach a request id, honoring one supplied by the client.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&id) {
        request
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value.clone());
        let mut response = next.run(request).await;
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        response
    } else {
        next.run(request).await
    }
}

/// Log each request and record count/latency metrics.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = sanitize_path(request.uri().path());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed = started.elapsed();

    info!(
        method = %method,
        path = %path,
        status,
        elapsed_ms = elapsed.as_millis() as u64,
        "Request handled"
    );

    counter!(
        "vflow_api_requests_total",
        "method" => method.to_string(),
        "path" => path.clone(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        "vflow_api_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path,
    )
    .record(elapsed.as_secs_f64());

    response
}

/// CORS layer from configuration. `*` allows any origin.
pub fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors_allowed_origins.trim() == "*" {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .split(',')
            .filter_map(|o| o.trim().parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Best-effort client address for engagement audit rows.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get(header::FORWARDED)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_absent_without_headers() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
