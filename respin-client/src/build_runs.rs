//! BuildRun endpoints

use reqwest::Method;
use respin_core::domain::build_run::BuildRun;
use respin_core::domain::meta::ObjectList;

use crate::error::Result;
use crate::{ClusterClient, SHIPWRIGHT_GROUP_VERSION, collection_path, object_path};

impl ClusterClient {
    /// List all build runs in a namespace
    pub async fn list_build_runs(&self, namespace: &str) -> Result<Vec<BuildRun>> {
        let path = collection_path(SHIPWRIGHT_GROUP_VERSION, namespace, "buildruns");
        tracing::debug!("GET {}", path);

        let response = self.request(Method::GET, &path).send().await?;
        let list: ObjectList<BuildRun> = self.handle_response(response).await?;

        Ok(list.items)
    }

    /// Get a build run by name
    pub async fn get_build_run(&self, namespace: &str, name: &str) -> Result<BuildRun> {
        let path = object_path(SHIPWRIGHT_GROUP_VERSION, namespace, "buildruns", name);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Create a build run
    ///
    /// # Returns
    /// The object as stored by the API server, including a generated name
    pub async fn create_build_run(&self, namespace: &str, build_run: &BuildRun) -> Result<BuildRun> {
        let path = collection_path(SHIPWRIGHT_GROUP_VERSION, namespace, "buildruns");
        tracing::debug!("POST {}", path);

        let response = self
            .request(Method::POST, &path)
            .json(build_run)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
