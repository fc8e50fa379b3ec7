//! Completion waiter
//!
//! Polls a build run until it reports a terminal `Succeeded` condition or its
//! timeout runs out.
//!
//! States:
//! - `Polling`: no verdict yet; fetch again after the poll interval
//! - `Succeeded`: condition `True` and a completion time is set
//! - `Failed`: condition `False`, carrying the condition message
//! - `TimedOut`: the deadline passed before a verdict

use respin_client::ClientError;
use respin_core::domain::build_run::{BuildRun, ConditionStatus, SUCCEEDED};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::repository::BuildRepository;
use crate::service::timeout::resolve_timeout;

/// Interval between two status fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum WaitState {
    Polling,
    Succeeded(BuildRun),
    Failed(String),
    TimedOut,
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("build run {name} did not finish within {timeout:?}")]
    TimedOut { name: String, timeout: Duration },

    #[error("build run {name} failed: {message}")]
    Failed { name: String, message: String },

    #[error("failed to fetch build run {name}: {source}")]
    Api {
        name: String,
        #[source]
        source: ClientError,
    },
}

/// Maps a fetched build run onto the next state
///
/// A `True` condition without a completion time means the status is still being
/// written, so polling continues.
pub fn observe(build_run: BuildRun) -> WaitState {
    let (status, message) = match build_run.condition(SUCCEEDED) {
        Some(condition) => (condition.status, condition.message.clone()),
        None => return WaitState::Polling,
    };

    match status {
        ConditionStatus::True if build_run.completion_time().is_some() => {
            WaitState::Succeeded(build_run)
        }
        ConditionStatus::False => WaitState::Failed(message),
        _ => WaitState::Polling,
    }
}

pub struct CompletionWaiter {
    builds: Arc<dyn BuildRepository>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    default_timeout: Duration,
}

impl CompletionWaiter {
    pub fn new(
        builds: Arc<dyn BuildRepository>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
        default_timeout: Duration,
    ) -> Self {
        Self {
            builds,
            clock,
            poll_interval,
            default_timeout,
        }
    }

    /// Waits for the run using the timeout resolved from the run and its build
    pub async fn wait(&self, build_run: &BuildRun) -> Result<BuildRun, WaitError> {
        let timeout = resolve_timeout(self.builds.as_ref(), build_run, self.default_timeout).await;
        self.wait_with_timeout(build_run.namespace(), build_run.name(), timeout)
            .await
    }

    pub async fn wait_with_timeout(
        &self,
        namespace: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<BuildRun, WaitError> {
        info!("Waiting up to {:?} for build run {}", timeout, name);
        let started = self.clock.now();

        loop {
            match self.poll(namespace, name, started, timeout).await? {
                WaitState::Polling => self.clock.sleep(self.poll_interval).await,
                WaitState::Succeeded(build_run) => {
                    info!("Build run {} succeeded", name);
                    return Ok(build_run);
                }
                WaitState::Failed(message) => {
                    return Err(WaitError::Failed {
                        name: name.to_string(),
                        message,
                    });
                }
                WaitState::TimedOut => {
                    return Err(WaitError::TimedOut {
                        name: name.to_string(),
                        timeout,
                    });
                }
            }
        }
    }

    async fn poll(
        &self,
        namespace: &str,
        name: &str,
        started: Instant,
        timeout: Duration,
    ) -> Result<WaitState, WaitError> {
        if self.clock.now().duration_since(started) >= timeout {
            return Ok(WaitState::TimedOut);
        }

        let current = self
            .builds
            .get_build_run(namespace, name)
            .await
            .map_err(|source| WaitError::Api {
                name: name.to_string(),
                source,
            })?;

        let state = observe(current);
        debug!("Build run {} is {}", name, state_label(&state));
        Ok(state)
    }
}

fn state_label(state: &WaitState) -> &'static str {
    match state {
        WaitState::Polling => "Polling",
        WaitState::Succeeded(_) => "Succeeded",
        WaitState::Failed(_) => "Failed",
        WaitState::TimedOut => "TimedOut",
    }
}
