pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::api::router::create_router;
use crate::config::Config;
use crate::infra::factory::bootstrap_state;

const LOG_DIR: &str = "./logs";

/// Installs the global subscriber: daily-rotated JSON files plus a pretty
/// console layer. The returned guard flushes the file writer on drop.
pub fn init_logging() -> WorkerGuard {
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, "fitcore-service.log"));

    let json_to_file = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("info,fitcore_backend=debug"));

    let console = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry().with(json_to_file).with(console).init();

    info!("Logging initialized, JSON file output under {}", LOG_DIR);
    guard
}

pub async fn run() {
    let _log_guard = init_logging();

    let config = Config::from_env();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(bootstrap_state(&config).await);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server port");

    info!("🚀 fitcore backend listening on {}", addr);
    axum::serve(listener, app).await.expect("Server error");
}
