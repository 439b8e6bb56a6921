//! API server configuration.

use vflow_models::MAX_UPLOAD_BYTES;

/// Runtime configuration for the HTTP API, read from environment variables
/// at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Hard ceiling on request bodies. Slightly above the upload limit so
    /// multipart framing overhead does not reject a maximum-size video.
    pub max_body_bytes: usize,
    /// Allowed CORS origins, comma separated; `*` for any
    pub cors_allowed_origins: String,
    /// Production mode hides internal error detail from responses
    pub production: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: (MAX_UPLOAD_BYTES as usize) + 1024 * 1024,
            cors_allowed_origins: "*".to_string(),
            production: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            max_body_bytes: std::env::var("API_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            production: std::env::var("ENVIRONMENT")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(defaults.production),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_ceiling_exceeds_upload_limit() {
        let config = ApiConfig::default();
        assert!(config.max_body_bytes as u64 > MAX_UPLOAD_BYTES);
    }

    #[test]
    fn bind_addr_formats() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
