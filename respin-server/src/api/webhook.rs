//! Webhook API Handler
//!
//! Entry point for push notifications. Everything up to the dispatch decision runs
//! before responding; an accepted rebuild continues as a tracked background task.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use respin_core::dto::event::PushEvent;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::signature::{SIGNATURE_HEADER, validate_signature};
use crate::service::rebuild::Dispatch;

pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// POST /
/// Receives a push notification and triggers the matching rebuild
///
/// - 202: a rebuild was started in the background
/// - 400: the payload could not be decoded
/// - 401: signature validation failed
/// - 404: no build, build run or service matched
/// - 500: the cluster could not be queried
pub async fn handle_push(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery = headers
        .get(DELIVERY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    async move {
        match process_push(&state, &headers, &body).await {
            Ok(status) => status.into_response(),
            Err(err) => err.into_response(),
        }
    }
    .instrument(info_span!("delivery", id = %delivery))
    .await
}

async fn process_push(state: &AppState, headers: &HeaderMap, body: &[u8]) -> ApiResult<StatusCode> {
    if let Some(secret) = &state.webhook_secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        if !validate_signature(secret, body, signature) {
            return Err(ApiError::Unauthorized);
        }
    }

    let event: PushEvent = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid push payload: {}", e)))?;
    let repository = event.repository.clone_url.as_str();
    if repository.is_empty() {
        return Err(ApiError::BadRequest(
            "push payload has an empty repository.clone_url".to_string(),
        ));
    }

    info!(
        "Received push for {} ({})",
        repository,
        event.git_ref.as_deref().unwrap_or("unknown ref")
    );

    let session = state.connector.connect().await?;

    match state.rebuilder.dispatch(session, repository).await? {
        Dispatch::NotFound => Ok(StatusCode::NOT_FOUND),
        Dispatch::Accepted(job) => {
            let service = job.service_name().to_string();
            state.tracker.spawn(
                async move {
                    match job.run().await {
                        Ok(_) => info!("Rebuild of service {} finished", service),
                        Err(e) => error!("Rebuild of service {} failed: {}", service, e),
                    }
                }
                .in_current_span(),
            );
            Ok(StatusCode::ACCEPTED)
        }
    }
}
