//! Service locator
//!
//! Finds the Knative service deployed from a given image.

use respin_client::ClientError;
use respin_core::domain::service::Service;
use thiserror::Error;

use crate::repository::ServiceRepository;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("failed to list services: {0}")]
    Listing(#[from] ClientError),

    #[error("image {image} is claimed by several services: {}", services.join(", "))]
    Ambiguous { image: String, services: Vec<String> },
}

/// Finds the single service whose user-image annotation equals `image` exactly
///
/// `Ok(None)` means no service was deployed from the image. More than one match is
/// rejected rather than picking one at random.
pub async fn find_service(
    services: &dyn ServiceRepository,
    namespace: &str,
    image: &str,
) -> Result<Option<Service>, LocateError> {
    let mut matches: Vec<Service> = services
        .list_services(namespace)
        .await?
        .into_iter()
        .filter(|service| service.user_image() == Some(image))
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(LocateError::Ambiguous {
            image: image.to_string(),
            services: matches.iter().map(|s| s.name().to_string()).collect(),
        }),
    }
}
