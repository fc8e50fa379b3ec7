//! Rebuild orchestrator
//!
//! Resolves a pushed repository to a build (or a standalone build run) and the
//! Knative service deployed from its image. The synchronous part ends with a
//! [`Dispatch`] decision; the accepted [`RebuildJob`] is run in the background by the
//! caller: create a build run, wait for it, nudge the service.

use respin_client::ClientError;
use respin_core::domain::build::Build;
use respin_core::domain::build_run::BuildRun;
use respin_core::domain::service::Service;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::clock::Clock;
use crate::repository::ClusterSession;
use crate::service::locator::{LocateError, find_service};
use crate::service::matcher::{match_build, match_build_run};
use crate::service::nudge::nudge_service;
use crate::service::waiter::{CompletionWaiter, WaitError};

/// Errors that decide the response to the webhook
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("failed to list builds: {0}")]
    ListBuilds(#[source] ClientError),

    #[error("failed to list build runs: {0}")]
    ListBuildRuns(#[source] ClientError),

    #[error(transparent)]
    Locate(#[from] LocateError),
}

/// Errors of the background part; they end the job and are only logged
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to create build run for {origin}: {source}")]
    Create {
        origin: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("failed to update service {service}: {source}")]
    Nudge {
        service: String,
        #[source]
        source: ClientError,
    },
}

/// Outcome of resolving a repository
pub enum Dispatch {
    /// Work was found; the job still has to be run
    Accepted(RebuildJob),
    /// No build, build run or service matched
    NotFound,
}

/// How the new build run is produced
enum RebuildPlan {
    /// Run the build by reference
    Build(Build),
    /// Resubmit a copy of a standalone build run
    Resubmit(BuildRun),
}

impl RebuildPlan {
    fn describe(&self) -> String {
        match self {
            RebuildPlan::Build(build) => format!("build {}", build.name()),
            RebuildPlan::Resubmit(run) => format!("standalone build run {}", run.name()),
        }
    }
}

/// Builds dispatch decisions for inbound pushes
pub struct Rebuilder {
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    default_timeout: Duration,
}

impl Rebuilder {
    pub fn new(clock: Arc<dyn Clock>, poll_interval: Duration, default_timeout: Duration) -> Self {
        Self {
            clock,
            poll_interval,
            default_timeout,
        }
    }

    /// Decides what to rebuild for a pushed repository
    ///
    /// A matching build always takes priority over standalone build runs.
    pub async fn dispatch(
        &self,
        session: ClusterSession,
        repository: &str,
    ) -> Result<Dispatch, RebuildError> {
        let namespace = session.namespace.clone();

        let build = match_build(session.builds.as_ref(), &namespace, repository)
            .await
            .map_err(RebuildError::ListBuilds)?;
        if let Some(build) = build {
            info!("Found build {} that references {}", build.name(), repository);
            let image = build.spec.output.image.clone();
            return self.prepare(session, &image, RebuildPlan::Build(build)).await;
        }

        let build_run = match_build_run(session.builds.as_ref(), &namespace, repository)
            .await
            .map_err(RebuildError::ListBuildRuns)?;
        if let Some(build_run) = build_run {
            info!(
                "Found standalone build run {} that references {}",
                build_run.name(),
                repository
            );
            let image = build_run
                .embedded_spec()
                .map(|spec| spec.output.image.clone())
                .unwrap_or_default();
            return self
                .prepare(session, &image, RebuildPlan::Resubmit(build_run))
                .await;
        }

        info!(
            "Found no suitable build or standalone build run in namespace {} for repository {}",
            namespace, repository
        );
        Ok(Dispatch::NotFound)
    }

    async fn prepare(
        &self,
        session: ClusterSession,
        image: &str,
        plan: RebuildPlan,
    ) -> Result<Dispatch, RebuildError> {
        let Some(service) = find_service(session.services.as_ref(), &session.namespace, image).await?
        else {
            info!(
                "Found no service in namespace {} with image {}",
                session.namespace, image
            );
            return Ok(Dispatch::NotFound);
        };

        let waiter = CompletionWaiter::new(
            session.builds.clone(),
            self.clock.clone(),
            self.poll_interval,
            self.default_timeout,
        );

        Ok(Dispatch::Accepted(RebuildJob {
            session,
            service,
            plan,
            waiter,
            clock: self.clock.clone(),
        }))
    }
}

/// Background part of a rebuild
pub struct RebuildJob {
    session: ClusterSession,
    service: Service,
    plan: RebuildPlan,
    waiter: CompletionWaiter,
    clock: Arc<dyn Clock>,
}

impl RebuildJob {
    /// Service that gets nudged once the build run succeeds
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Creates the build run, waits for it and nudges the service
    ///
    /// # Returns
    /// The service as stored after the nudge
    pub async fn run(self) -> Result<Service, JobError> {
        let namespace = self.session.namespace.as_str();

        let request = match &self.plan {
            RebuildPlan::Build(build) => BuildRun::for_build(build),
            RebuildPlan::Resubmit(build_run) => {
                let name = format!(
                    "rebuild-build-run-{}",
                    self.clock.utc_now().format("%Y%m%d%H%M%S")
                );
                build_run.resubmission(name)
            }
        };

        info!("Creating build run for {}", self.plan.describe());
        let created = self
            .session
            .builds
            .create_build_run(namespace, &request)
            .await
            .map_err(|source| JobError::Create {
                origin: self.plan.describe(),
                source,
            })?;
        info!("Created build run {}", created.name());

        self.waiter.wait(&created).await?;

        nudge_service(
            self.session.services.as_ref(),
            namespace,
            &self.service,
            self.clock.utc_now(),
        )
        .await
        .map_err(|source| JobError::Nudge {
            service: self.service.name().to_string(),
            source,
        })
    }
}
