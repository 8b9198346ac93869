//! This file defines the boss-ingest binary entry point.

use boss_ingest::app;
use boss_ingest::cli;
use boss_ingest::metrics;
use boss_ingest::server;
use boss_ingest::tracing;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    ::tracing::info!("{:?}", args);
    metrics::register_metrics();
    let service = app::service(&args);
    server::serve(&args, service).await;
    tracing::shutdown_tracing();
}
