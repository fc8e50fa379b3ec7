//! Revision nudger
//!
//! Knative rolls out a new revision whenever the service template changes. Stamping
//! the template with the current time forces one without touching the image
//! reference, so the freshly pushed image behind the same tag gets pulled.

use chrono::{DateTime, SecondsFormat, Utc};
use respin_client::Result;
use respin_core::domain::service::{Service, UPDATE_TIMESTAMP_ANNOTATION};
use tracing::info;

use crate::repository::ServiceRepository;

/// RFC 3339 in UTC with second precision, e.g. `2024-05-01T12:00:00Z`
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sets the update timestamp annotation on the service template and persists it
///
/// The service is read again right before the write, so the update carries its
/// current `resourceVersion` rather than the one seen when the rebuild started.
pub async fn nudge_service(
    services: &dyn ServiceRepository,
    namespace: &str,
    service: &Service,
    now: DateTime<Utc>,
) -> Result<Service> {
    info!(
        "Nudging Knative service {} to force a new revision",
        service.name()
    );

    let mut updated = services.get_service(namespace, service.name()).await?;
    updated
        .spec
        .template
        .metadata
        .annotations
        .insert(UPDATE_TIMESTAMP_ANNOTATION.to_string(), format_timestamp(now));

    services.update_service(namespace, &updated).await
}
