//! Worker binary entry point.

use std::process;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vflow_queue::JobQueue;
use vflow_worker::{health, JobExecutor, ProcessingContext, WorkerConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vflow=info,vflow_worker=info,warn"));

    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::from_env();
    info!(?config, "Starting worker");

    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to install metrics recorder: {}", e);
            process::exit(1);
        }
    };

    let queue = match JobQueue::from_env() {
        Ok(queue) => queue,
        Err(e) => {
            error!("Failed to create queue client: {}", e);
            process::exit(1);
        }
    };

    let health_port = config.health_port;
    let ctx = match ProcessingContext::new(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to build processing context: {}", e);
            process::exit(1);
        }
    };

    let executor = Arc::new(JobExecutor::new(queue, ctx));

    let running = executor.running_flag();
    tokio::spawn(async move {
        if let Err(e) = health::serve(health_port, running, metrics_handle).await {
            error!("Health endpoint failed: {}", e);
        }
    });

    let shutdown_executor = Arc::clone(&executor);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_executor.shutdown();
        }
    });

    if let Err(e) = executor.run().await {
        error!("Worker exited with error: {}", e);
        process::exit(1);
    }
}
