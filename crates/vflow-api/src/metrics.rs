//! Prometheus metrics for the API.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the process-wide recorder. Called once from main.
pub fn install() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| e.to_string())
}

/// Path segments followed by a per-video id.
const ID_PARENTS: &[&str] = &["video", "view", "like"];

/// Collapse path parameters so per-video ids do not explode label
/// cardinality: `/view/abc-123` becomes `/view/:id`.
pub fn sanitize_path(path: &str) -> String {
    let mut out = Vec::new();
    let mut segments = path.split('/').peekable();

    while let Some(segment) = segments.next() {
        out.push(segment.to_string());
        if ID_PARENTS.contains(&segment) {
            if let Some(next) = segments.peek() {
                if !next.is_empty() {
                    segments.next();
                    out.push(":id".to_string());
                }
            }
        }
    }

    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_ids_are_collapsed() {
        assert_eq!(sanitize_path("/view/550e8400-e29b"), "/view/:id");
        assert_eq!(sanitize_path("/like/abc"), "/like/:id");
        assert_eq!(sanitize_path("/video/abc-123"), "/video/:id");
    }

    #[test]
    fn static_paths_pass_through() {
        assert_eq!(sanitize_path("/videos"), "/videos");
        assert_eq!(sanitize_path("/stats"), "/stats");
        assert_eq!(sanitize_path("/health"), "/health");
    }
}
