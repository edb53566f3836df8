//! Summit server
//!
//! Single-process server wiring the conference service over the in-memory
//! ports, serving the HTTP API, and running the background jobs.

use std::sync::Arc;
use std::time::Duration;
use summit_core::memory::{MemoryCacheStore, MemoryEntityStore, MemoryTaskDispatcher};
use summit_core::ConferenceService;
use summit_web::{build_router, jobs, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,summit_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(addr = %config.bind_addr(), "Configuration loaded");

    let (dispatcher, task_queue) = MemoryTaskDispatcher::channel();
    let service = Arc::new(ConferenceService::new(
        Arc::new(MemoryEntityStore::new()),
        Arc::new(MemoryCacheStore::new()),
        Arc::new(dispatcher),
    ));

    tokio::spawn(jobs::run_task_worker(service.clone(), task_queue));
    tokio::spawn(jobs::run_announcement_refresh(
        service.clone(),
        Duration::from_secs(config.jobs.announcement_interval),
    ));

    let router = build_router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Summit server is running");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down gracefully...");
        })
        .await?;

    Ok(())
}
