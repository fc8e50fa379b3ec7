//! Knative Service endpoints

use reqwest::Method;
use respin_core::domain::meta::ObjectList;
use respin_core::domain::service::Service;

use crate::error::Result;
use crate::{ClusterClient, KNATIVE_SERVING_GROUP_VERSION, collection_path, object_path};

impl ClusterClient {
    /// List all Knative services in a namespace
    pub async fn list_services(&self, namespace: &str) -> Result<Vec<Service>> {
        let path = collection_path(KNATIVE_SERVING_GROUP_VERSION, namespace, "services");
        tracing::debug!("GET {}", path);

        let response = self.request(Method::GET, &path).send().await?;
        let list: ObjectList<Service> = self.handle_response(response).await?;

        Ok(list.items)
    }

    /// Get a Knative service by name
    pub async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        let path = object_path(KNATIVE_SERVING_GROUP_VERSION, namespace, "services", name);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Replace a Knative service
    ///
    /// The object's `resourceVersion` is sent along, so the API server rejects the
    /// update with 409 if the service changed since it was read.
    pub async fn update_service(&self, namespace: &str, service: &Service) -> Result<Service> {
        let path = object_path(
            KNATIVE_SERVING_GROUP_VERSION,
            namespace,
            "services",
            service.name(),
        );
        tracing::debug!("PUT {}", path);

        let mut body = service.clone();
        body.ensure_type_meta();

        let response = self.request(Method::PUT, &path).json(&body).send().await?;

        self.handle_response(response).await
    }
}
