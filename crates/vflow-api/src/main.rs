//! API binary entry point.

use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vflow_api::routes::build_router;
use vflow_api::{ApiConfig, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vflow=info,vflow_api=info,tower_http=info,warn"));

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

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env();
    vflow_api::error::set_production(config.production);
    info!(?config, "Starting API server");

    let metrics_handle = match vflow_api::metrics::install() {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to install metrics recorder: {}", e);
            process::exit(1);
        }
    };

    let addr = config.bind_addr();
    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            process::exit(1);
        }
    };

    let app = build_router(state, metrics_handle);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            process::exit(1);
        }
    };

    info!("Listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
