//! HTTP API for the VidFlow backend.
//!
//! Serves video submission, engagement recording and read endpoints over
//! axum. Uploads stream to the object store, the canonical record lands in
//! Postgres, and a processing job is enqueued per accepted upload.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
