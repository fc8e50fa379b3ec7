//! In-memory cluster used by the tests

use async_trait::async_trait;
use respin_client::{ClientError, Result};
use respin_core::domain::build::Build;
use respin_core::domain::build_run::{BuildRun, BuildRunStatus};
use respin_core::domain::service::Service;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::repository::{BuildRepository, ClusterConnector, ClusterSession, ServiceRepository};

pub const NAMESPACE: &str = "dev";

#[derive(Default)]
struct State {
    builds: Vec<Build>,
    build_runs: Vec<BuildRun>,
    services: Vec<Service>,
    /// Statuses handed out on successive fetches; the last one repeats
    scripts: HashMap<String, VecDeque<BuildRunStatus>>,
    created_script: Vec<BuildRunStatus>,
    fetches: HashMap<String, usize>,
    created: Vec<BuildRun>,
    updated: Vec<Service>,
    fail_listings: bool,
    fail_creates: bool,
    fail_updates: bool,
}

#[derive(Default)]
pub struct MemoryCluster {
    state: Mutex<State>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_build(self, build: Build) -> Self {
        self.state().builds.push(build);
        self
    }

    pub fn with_build_run(self, build_run: BuildRun) -> Self {
        self.state().build_runs.push(build_run);
        self
    }

    pub fn with_service(self, service: Service) -> Self {
        self.state().services.push(service);
        self
    }

    pub fn with_status_script(self, name: &str, statuses: Vec<BuildRunStatus>) -> Self {
        self.state()
            .scripts
            .insert(name.to_string(), statuses.into());
        self
    }

    /// Status script for every build run created from now on
    pub fn with_created_status_script(self, statuses: Vec<BuildRunStatus>) -> Self {
        self.state().created_script = statuses;
        self
    }

    pub fn failing_listings(self) -> Self {
        self.state().fail_listings = true;
        self
    }

    pub fn failing_creates(self) -> Self {
        self.state().fail_creates = true;
        self
    }

    pub fn failing_updates(self) -> Self {
        self.state().fail_updates = true;
        self
    }

    pub fn created_build_runs(&self) -> Vec<BuildRun> {
        self.state().created.clone()
    }

    pub fn updated_services(&self) -> Vec<Service> {
        self.state().updated.clone()
    }

    pub fn fetch_count(&self, name: &str) -> usize {
        self.state().fetches.get(name).copied().unwrap_or(0)
    }
}

fn not_found(kind: &str, name: &str) -> ClientError {
    ClientError::api_error(404, format!("{} \"{}\" not found", kind, name))
}

fn unavailable() -> ClientError {
    ClientError::api_error(503, "the server is currently unable to handle the request")
}

#[async_trait]
impl BuildRepository for MemoryCluster {
    async fn list_builds(&self, _namespace: &str) -> Result<Vec<Build>> {
        let state = self.state();
        if state.fail_listings {
            return Err(unavailable());
        }
        Ok(state.builds.clone())
    }

    async fn get_build(&self, _namespace: &str, name: &str) -> Result<Build> {
        self.state()
            .builds
            .iter()
            .find(|b| b.name() == name)
            .cloned()
            .ok_or_else(|| not_found("builds.shipwright.io", name))
    }

    async fn list_build_runs(&self, _namespace: &str) -> Result<Vec<BuildRun>> {
        let state = self.state();
        if state.fail_listings {
            return Err(unavailable());
        }
        Ok(state.build_runs.clone())
    }

    async fn get_build_run(&self, _namespace: &str, name: &str) -> Result<BuildRun> {
        let mut state = self.state();
        *state.fetches.entry(name.to_string()).or_default() += 1;

        let status = state.scripts.get_mut(name).and_then(|script| {
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        });

        let mut build_run = state
            .build_runs
            .iter()
            .find(|r| r.name() == name)
            .cloned()
            .ok_or_else(|| not_found("buildruns.shipwright.io", name))?;
        if status.is_some() {
            build_run.status = status;
        }
        Ok(build_run)
    }

    async fn create_build_run(&self, namespace: &str, build_run: &BuildRun) -> Result<BuildRun> {
        let mut state = self.state();
        if state.fail_creates {
            return Err(ClientError::api_error(403, "buildruns.shipwright.io is forbidden"));
        }

        let mut stored = build_run.clone();
        if stored.metadata.name.is_empty() {
            let prefix = stored.metadata.generate_name.clone().unwrap_or_default();
            stored.metadata.name = format!("{}{:05}", prefix, state.created.len() + 1);
        }
        if stored.metadata.namespace.is_empty() {
            stored.metadata.namespace = namespace.to_string();
        }

        if !state.created_script.is_empty() {
            let script = state.created_script.clone().into();
            state.scripts.insert(stored.name().to_string(), script);
        }
        state.build_runs.push(stored.clone());
        state.created.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl ServiceRepository for MemoryCluster {
    async fn list_services(&self, _namespace: &str) -> Result<Vec<Service>> {
        let state = self.state();
        if state.fail_listings {
            return Err(unavailable());
        }
        Ok(state.services.clone())
    }

    async fn get_service(&self, _namespace: &str, name: &str) -> Result<Service> {
        self.state()
            .services
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| not_found("services.serving.knative.dev", name))
    }

    /// Rejects writes carrying a stale `resourceVersion` and bumps it on success
    async fn update_service(&self, _namespace: &str, service: &Service) -> Result<Service> {
        let mut state = self.state();
        if state.fail_updates {
            return Err(conflict());
        }

        let existing = state
            .services
            .iter_mut()
            .find(|s| s.name() == service.name())
            .ok_or_else(|| not_found("services.serving.knative.dev", service.name()))?;
        if service.metadata.resource_version.is_some()
            && service.metadata.resource_version != existing.metadata.resource_version
        {
            return Err(conflict());
        }

        let version = existing
            .metadata
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let mut stored = service.clone();
        stored.metadata.resource_version = Some((version + 1).to_string());
        *existing = stored.clone();

        state.updated.push(service.clone());
        Ok(stored)
    }
}

fn conflict() -> ClientError {
    ClientError::api_error(
        409,
        "the object has been modified; please apply your changes to the latest version",
    )
}

pub fn session(cluster: Arc<MemoryCluster>) -> ClusterSession {
    ClusterSession {
        namespace: NAMESPACE.to_string(),
        builds: cluster.clone(),
        services: cluster,
    }
}

/// Hands out sessions over one in-memory cluster, or fails like a broken setup
pub struct StaticConnector {
    cluster: Option<Arc<MemoryCluster>>,
}

impl StaticConnector {
    pub fn new(cluster: Arc<MemoryCluster>) -> Self {
        Self {
            cluster: Some(cluster),
        }
    }

    pub fn broken() -> Self {
        Self { cluster: None }
    }
}

#[async_trait]
impl ClusterConnector for StaticConnector {
    async fn connect(&self) -> Result<ClusterSession> {
        match &self.cluster {
            Some(cluster) => Ok(session(cluster.clone())),
            None => Err(ClientError::Config(
                "KUBERNETES_SERVICE_HOST not set".to_string(),
            )),
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn build(name: &str, git_url: &str, image: &str) -> Build {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "shipwright.io/v1beta1",
        "kind": "Build",
        "metadata": {"name": name, "namespace": NAMESPACE},
        "spec": {
            "source": {"type": "Git", "git": {"url": git_url}},
            "strategy": {"name": "buildkit", "kind": "ClusterBuildStrategy"},
            "output": {"image": image}
        }
    }))
    .unwrap()
}

/// A standalone run with an embedded spec and no status yet
pub fn build_run(name: &str, git_url: &str, image: &str) -> BuildRun {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "shipwright.io/v1beta1",
        "kind": "BuildRun",
        "metadata": {"name": name, "namespace": NAMESPACE},
        "spec": {
            "build": {
                "spec": {
                    "source": {"type": "Git", "git": {"url": git_url}},
                    "strategy": {"name": "buildkit", "kind": "ClusterBuildStrategy"},
                    "output": {"image": image}
                }
            }
        }
    }))
    .unwrap()
}

pub fn completed_build_run(name: &str, git_url: &str, image: &str, completed_at: &str) -> BuildRun {
    let mut run = build_run(name, git_url, image);
    let mut status = succeeded_status();
    status.completion_time = Some(completed_at.parse().unwrap());
    run.status = Some(status);
    run
}

pub fn service(name: &str, image: &str) -> Service {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "serving.knative.dev/v1",
        "kind": "Service",
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "resourceVersion": "1",
            "annotations": {"client.knative.dev/user-image": image}
        },
        "spec": {
            "template": {
                "spec": {"containers": [{"image": image}]}
            }
        }
    }))
    .unwrap()
}

fn status(value: serde_json::Value) -> BuildRunStatus {
    serde_json::from_value(value).unwrap()
}

pub fn pending_status() -> BuildRunStatus {
    status(serde_json::json!({
        "conditions": [{"type": "Succeeded", "status": "Unknown", "reason": "Running"}]
    }))
}

pub fn succeeded_status() -> BuildRunStatus {
    status(serde_json::json!({
        "conditions": [{"type": "Succeeded", "status": "True", "reason": "Succeeded"}],
        "completionTime": "2024-05-01T12:05:00Z"
    }))
}

pub fn failed_status(message: &str) -> BuildRunStatus {
    status(serde_json::json!({
        "conditions": [{"type": "Succeeded", "status": "False", "reason": "Failed", "message": message}],
        "completionTime": "2024-05-01T12:05:00Z"
    }))
}
