//! Repository layer
//!
//! Repositories are thin, stateless views of the cluster API. They provide focused
//! interfaces for the resources the rebuild flow touches, without any business logic.
//!
//! All repositories are trait-based so the services can run against in-memory fakes.

mod cluster;

use async_trait::async_trait;
use respin_client::Result;
use respin_core::domain::build::Build;
use respin_core::domain::build_run::BuildRun;
use respin_core::domain::service::Service;
use std::sync::Arc;

pub use cluster::InClusterConnector;

/// Access to Shipwright builds and build runs
#[async_trait]
pub trait BuildRepository: Send + Sync {
    /// Lists every build in the namespace
    async fn list_builds(&self, namespace: &str) -> Result<Vec<Build>>;

    /// Fetches a build by name
    async fn get_build(&self, namespace: &str, name: &str) -> Result<Build>;

    /// Lists every build run in the namespace
    async fn list_build_runs(&self, namespace: &str) -> Result<Vec<BuildRun>>;

    /// Fetches a build run by name
    async fn get_build_run(&self, namespace: &str, name: &str) -> Result<BuildRun>;

    /// Creates a build run and returns it as stored
    async fn create_build_run(&self, namespace: &str, build_run: &BuildRun) -> Result<BuildRun>;
}

/// Access to Knative services
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Lists every service in the namespace
    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>>;

    /// Fetches a service by name
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service>;

    /// Replaces a service and returns it as stored
    async fn update_service(&self, namespace: &str, service: &Service) -> Result<Service>;
}

/// Request-scoped access to the cluster
#[derive(Clone)]
pub struct ClusterSession {
    /// Namespace all lookups and writes happen in
    pub namespace: String,
    pub builds: Arc<dyn BuildRepository>,
    pub services: Arc<dyn ServiceRepository>,
}

/// Produces a cluster session for each inbound request
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(&self) -> Result<ClusterSession>;
}
