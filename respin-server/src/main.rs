//! Respin
//!
//! Receives push webhooks and rebuilds the matching Shipwright build (or standalone
//! build run), then rolls the Knative service deployed from its image.
//!
//! Architecture:
//! - Configuration: settings from environment or defaults
//! - Repositories: cluster access through the Kubernetes REST API
//! - Services: matching, waiting, nudging
//! - API: webhook and health endpoints
//! - Tracker: background rebuilds, drained on shutdown

mod api;
mod clock;
mod config;
mod repository;
mod service;
#[cfg(test)]
mod testing;
mod tracker;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::repository::InClusterConnector;
use crate::service::rebuild::Rebuilder;
use crate::tracker::TaskTracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "respin_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Respin");

    let config = load_config()?;
    info!(
        "Poll interval: {:?}, default build run timeout: {:?}, max concurrent rebuilds: {}",
        config.poll_interval, config.default_build_run_timeout, config.max_concurrent_rebuilds
    );
    if config.webhook_secret.is_some() {
        info!("Webhook signature validation enabled");
    }

    let tracker = TaskTracker::new(config.max_concurrent_rebuilds);
    let state = AppState {
        connector: Arc::new(InClusterConnector::new(config.namespace_file.clone())),
        rebuilder: Arc::new(Rebuilder::new(
            Arc::new(SystemClock),
            config.poll_interval,
            config.default_build_run_timeout,
        )),
        tracker: tracker.clone(),
        webhook_secret: config.webhook_secret.clone(),
    };

    let app = api::create_router(state);

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown(shutdown_signal(), tracker))
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Loads configuration from environment variables with fallback to defaults
fn load_config() -> Result<Config> {
    match Config::from_env() {
        Ok(config) => {
            config.validate()?;
            Ok(config)
        }
        Err(_) => {
            info!("Failed to load config from environment, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Resolves once `signal` fired and every tracked rebuild finished
///
/// The listener keeps accepting requests until this resolves.
async fn shutdown(signal: impl Future<Output = ()>, tracker: TaskTracker) {
    signal.await;
    tracker.drain().await;
    info!("All rebuilds finished");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, waiting for running rebuilds..."),
        _ = terminate => info!("Received SIGTERM, waiting for running rebuilds..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_shutdown_waits_for_signal() {
        let tracker = TaskTracker::new(1);

        let pending = tokio::time::timeout(
            Duration::from_millis(50),
            shutdown(std::future::pending(), tracker),
        )
        .await;

        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_drains_tracked_rebuilds() {
        let tracker = TaskTracker::new(1);
        let (release, released) = oneshot::channel::<()>();
        tracker.spawn(async move {
            let _ = released.await;
        });

        let mut shutting_down = Box::pin(shutdown(async {}, tracker.clone()));
        let blocked = tokio::time::timeout(Duration::from_millis(50), &mut shutting_down).await;
        assert!(blocked.is_err(), "shutdown must wait for the running rebuild");

        release.send(()).unwrap();
        shutting_down.await;
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_without_rebuilds_is_immediate() {
        shutdown(async {}, TaskTracker::new(1)).await;
    }
}
