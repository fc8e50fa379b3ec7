//! API Error Handling
//!
//! Maps failures of the synchronous webhook path to status codes. Webhook
//! responses carry no body; the reason is only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use respin_client::ClientError;

use crate::service::locator::LocateError;
use crate::service::rebuild::RebuildError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Cluster(ClientError),
    Rebuild(RebuildError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Cluster(_) | ApiError::Rebuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Rejecting webhook: {}", msg);
            }
            ApiError::Unauthorized => {
                tracing::warn!("Rejecting webhook: signature validation failed");
            }
            ApiError::Cluster(err) => {
                tracing::error!("Failed to connect to the cluster: {}", err);
            }
            ApiError::Rebuild(RebuildError::Locate(LocateError::Ambiguous { image, services })) => {
                tracing::error!(
                    "Image {} is used by several services: {}",
                    image,
                    services.join(", ")
                );
            }
            ApiError::Rebuild(err) => {
                tracing::error!("Failed to dispatch rebuild: {}", err);
            }
        }

        self.status().into_response()
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        ApiError::Cluster(err)
    }
}

impl From<RebuildError> for ApiError {
    fn from(err: RebuildError) -> Self {
        ApiError::Rebuild(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("missing clone_url".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(ClientError::Config("no token".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let ambiguous = RebuildError::Locate(LocateError::Ambiguous {
            image: "registry/app".to_string(),
            services: vec!["a".to_string(), "b".to_string()],
        });
        let response = ApiError::from(ambiguous).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
