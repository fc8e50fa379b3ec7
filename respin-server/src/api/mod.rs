//! API Module
//!
//! HTTP API layer of the webhook server.

pub mod error;
pub mod health;
pub mod signature;
pub mod webhook;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::repository::ClusterConnector;
use crate::service::rebuild::Rebuilder;
use crate::tracker::TaskTracker;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn ClusterConnector>,
    pub rebuilder: Arc<Rebuilder>,
    pub tracker: TaskTracker,
    /// Enables signature validation when set
    pub webhook_secret: Option<String>,
}

/// Largest payload GitHub delivers to a webhook (25 MB)
pub const MAX_WEBHOOK_BODY: usize = 25 * 1024 * 1024;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Webhook
        .route(
            "/",
            post(webhook::handle_push).layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY)),
        )
        // Health check
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
