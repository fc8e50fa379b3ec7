//! Build endpoints

use reqwest::Method;
use respin_core::domain::build::Build;
use respin_core::domain::meta::ObjectList;

use crate::error::Result;
use crate::{ClusterClient, SHIPWRIGHT_GROUP_VERSION, collection_path, object_path};

impl ClusterClient {
    /// List all builds in a namespace
    pub async fn list_builds(&self, namespace: &str) -> Result<Vec<Build>> {
        let path = collection_path(SHIPWRIGHT_GROUP_VERSION, namespace, "builds");
        tracing::debug!("GET {}", path);

        let response = self.request(Method::GET, &path).send().await?;
        let list: ObjectList<Build> = self.handle_response(response).await?;

        Ok(list.items)
    }

    /// Get a build by name
    pub async fn get_build(&self, namespace: &str, name: &str) -> Result<Build> {
        let path = object_path(SHIPWRIGHT_GROUP_VERSION, namespace, "builds", name);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }
}
