//! Shared application state.

use std::sync::Arc;

use tracing::info;

use vflow_db::{connect, DbConfig, VideoRepo};
use vflow_queue::JobQueue;
use vflow_storage::ObjectStore;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Clients shared by all request handlers. Built once at startup; handlers
/// clone the `Arc`s instead of opening connections per request.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<ObjectStore>,
    pub repo: VideoRepo,
    pub queue: Arc<JobQueue>,
}

impl AppState {
    pub async fn new(config: ApiConfig) -> ApiResult<Self> {
        let storage = ObjectStore::from_env()
            .await
            .map_err(|e| ApiError::internal(format!("storage init failed: {e}")))?;

        let pool = connect(&DbConfig::from_env())
            .await
            .map_err(|e| ApiError::internal(format!("database init failed: {e}")))?;

        let queue = JobQueue::from_env()
            .map_err(|e| ApiError::internal(format!("queue init failed: {e}")))?;
        queue
            .init()
            .await
            .map_err(|e| ApiError::internal(format!("queue init failed: {e}")))?;

        info!("Application state initialized");

        Ok(Self {
            config,
            storage: Arc::new(storage),
            repo: VideoRepo::new(pool),
            queue: Arc::new(queue),
        })
    }
}
