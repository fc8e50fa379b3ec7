//! Cluster-backed repositories
//!
//! Implements the repository traits on top of [`ClusterClient`].

use async_trait::async_trait;
use respin_client::{ClusterClient, Result, read_namespace};
use respin_core::domain::build::Build;
use respin_core::domain::build_run::BuildRun;
use respin_core::domain::service::Service;
use std::sync::Arc;

use super::{BuildRepository, ClusterConnector, ClusterSession, ServiceRepository};

#[async_trait]
impl BuildRepository for ClusterClient {
    async fn list_builds(&self, namespace: &str) -> Result<Vec<Build>> {
        ClusterClient::list_builds(self, namespace).await
    }

    async fn get_build(&self, namespace: &str, name: &str) -> Result<Build> {
        ClusterClient::get_build(self, namespace, name).await
    }

    async fn list_build_runs(&self, namespace: &str) -> Result<Vec<BuildRun>> {
        ClusterClient::list_build_runs(self, namespace).await
    }

    async fn get_build_run(&self, namespace: &str, name: &str) -> Result<BuildRun> {
        ClusterClient::get_build_run(self, namespace, name).await
    }

    async fn create_build_run(&self, namespace: &str, build_run: &BuildRun) -> Result<BuildRun> {
        ClusterClient::create_build_run(self, namespace, build_run).await
    }
}

#[async_trait]
impl ServiceRepository for ClusterClient {
    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>> {
        ClusterClient::list_services(self, namespace).await
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        ClusterClient::get_service(self, namespace, name).await
    }

    async fn update_service(&self, namespace: &str, service: &Service) -> Result<Service> {
        ClusterClient::update_service(self, namespace, service).await
    }
}

/// Connects using the service account mounted into the pod
///
/// The namespace and credentials are read again for every request; projected service
/// account tokens are rotated by the kubelet.
pub struct InClusterConnector {
    namespace_file: String,
}

impl InClusterConnector {
    pub fn new(namespace_file: impl Into<String>) -> Self {
        Self {
            namespace_file: namespace_file.into(),
        }
    }
}

#[async_trait]
impl ClusterConnector for InClusterConnector {
    async fn connect(&self) -> Result<ClusterSession> {
        let namespace = read_namespace(&self.namespace_file).await?;
        let client = Arc::new(ClusterClient::in_cluster().await?);

        Ok(ClusterSession {
            namespace,
            builds: client.clone(),
            services: client,
        })
    }
}
