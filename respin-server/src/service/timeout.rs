//! Timeout resolver
//!
//! Decides how long to wait for a build run. The first timeout found wins:
//! 1. the run's own `spec.timeout`
//! 2. the referenced build's `spec.timeout` (build fetched by name)
//! 3. the embedded build spec's `timeout`
//! 4. the configured default

use respin_core::domain::build_run::BuildRun;
use respin_core::duration;
use std::time::Duration;
use tracing::{debug, warn};

use crate::repository::BuildRepository;

/// Used when neither the run nor its build declares a timeout
pub const DEFAULT_BUILD_RUN_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub async fn resolve_timeout(
    builds: &dyn BuildRepository,
    build_run: &BuildRun,
    default: Duration,
) -> Duration {
    if let Some(timeout) = parse_timeout(build_run.spec.timeout.as_deref(), "build run") {
        return timeout;
    }

    if let Some(name) = &build_run.spec.build.name {
        match builds.get_build(build_run.namespace(), name).await {
            Ok(build) => {
                if let Some(timeout) = parse_timeout(build.spec.timeout.as_deref(), "build") {
                    return timeout;
                }
            }
            Err(e) => debug!("Could not fetch build {} for its timeout: {}", name, e),
        }
    }

    if let Some(timeout) = parse_timeout(
        build_run.embedded_spec().and_then(|s| s.timeout.as_deref()),
        "embedded build spec",
    ) {
        return timeout;
    }

    default
}

/// Unparsable values count as absent
fn parse_timeout(value: Option<&str>, origin: &str) -> Option<Duration> {
    let value = value?;
    match duration::parse(value) {
        Ok(timeout) => Some(timeout),
        Err(e) => {
            warn!("Ignoring {} timeout {:?}: {}", origin, value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCluster, build, build_run};

    const REPO: &str = "https://example.com/org/app";

    /// A run referencing build "app" by name and embedding a spec as well
    fn run_with(run_timeout: Option<&str>, inline_timeout: Option<&str>) -> BuildRun {
        let mut run = build_run("run", REPO, "registry/app");
        run.spec.timeout = run_timeout.map(str::to_string);
        run.spec.build.name = Some("app".to_string());
        run.spec.build.spec.as_mut().unwrap().timeout = inline_timeout.map(str::to_string);
        run
    }

    fn cluster_with_build_timeout(timeout: Option<&str>) -> MemoryCluster {
        let mut app = build("app", REPO, "registry/app");
        app.spec.timeout = timeout.map(str::to_string);
        MemoryCluster::new().with_build(app)
    }

    #[tokio::test]
    async fn test_run_timeout_wins() {
        let cluster = cluster_with_build_timeout(Some("20m"));
        let run = run_with(Some("5m"), Some("30m"));

        let timeout = resolve_timeout(&cluster, &run, DEFAULT_BUILD_RUN_TIMEOUT).await;
        assert_eq!(timeout, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_referenced_build_timeout() {
        let cluster = cluster_with_build_timeout(Some("20m"));
        let run = run_with(None, Some("30m"));

        let timeout = resolve_timeout(&cluster, &run, DEFAULT_BUILD_RUN_TIMEOUT).await;
        assert_eq!(timeout, Duration::from_secs(1_200));
    }

    #[tokio::test]
    async fn test_embedded_spec_timeout() {
        let cluster = cluster_with_build_timeout(None);
        let run = run_with(None, Some("30m"));

        let timeout = resolve_timeout(&cluster, &run, DEFAULT_BUILD_RUN_TIMEOUT).await;
        assert_eq!(timeout, Duration::from_secs(1_800));
    }

    #[tokio::test]
    async fn test_default_timeout() {
        let cluster = cluster_with_build_timeout(None);
        let run = run_with(None, None);

        let timeout = resolve_timeout(&cluster, &run, DEFAULT_BUILD_RUN_TIMEOUT).await;
        assert_eq!(timeout, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_missing_build_falls_through() {
        let cluster = MemoryCluster::new();
        let run = run_with(None, Some("30m"));

        let timeout = resolve_timeout(&cluster, &run, DEFAULT_BUILD_RUN_TIMEOUT).await;
        assert_eq!(timeout, Duration::from_secs(1_800));
    }

    #[tokio::test]
    async fn test_unparsable_timeout_is_ignored() {
        let cluster = cluster_with_build_timeout(Some("twenty minutes"));
        let run = run_with(Some("soon"), None);

        let timeout = resolve_timeout(&cluster, &run, Duration::from_secs(42)).await;
        assert_eq!(timeout, Duration::from_secs(42));
    }
}
