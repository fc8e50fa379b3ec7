//! Resource matcher
//!
//! Finds the build, or failing that the most recent completed standalone build run,
//! whose git source references a repository. Filtering happens client side: the
//! declared git URL must contain the repository reference.

use respin_client::Result;
use respin_core::domain::build::{Build, BuildSpec};
use respin_core::domain::build_run::BuildRun;
use tracing::debug;

use crate::repository::BuildRepository;

/// Strips a trailing `.git` from a clone URL
pub fn normalize_repository(reference: &str) -> &str {
    reference.strip_suffix(".git").unwrap_or(reference)
}

/// Finds the first build in the namespace whose git source references `repository`
pub async fn match_build(
    builds: &dyn BuildRepository,
    namespace: &str,
    repository: &str,
) -> Result<Option<Build>> {
    let repository = normalize_repository(repository);
    let candidates = builds.list_builds(namespace).await?;
    debug!(
        "Checking {} build(s) in {} for {}",
        candidates.len(),
        namespace,
        repository
    );

    Ok(select_build(candidates, repository))
}

/// Finds the completed standalone build run that most recently built `repository`
pub async fn match_build_run(
    builds: &dyn BuildRepository,
    namespace: &str,
    repository: &str,
) -> Result<Option<BuildRun>> {
    let repository = normalize_repository(repository);
    let candidates = builds.list_build_runs(namespace).await?;
    debug!(
        "Checking {} build run(s) in {} for {}",
        candidates.len(),
        namespace,
        repository
    );

    Ok(select_build_run(candidates, repository))
}

fn references(spec: &BuildSpec, repository: &str) -> bool {
    spec.git_url().is_some_and(|url| url.contains(repository))
}

fn select_build(builds: Vec<Build>, repository: &str) -> Option<Build> {
    builds
        .into_iter()
        .find(|build| references(&build.spec, repository))
}

/// Latest completion wins; on equal completion times the first one seen stays.
fn select_build_run(runs: Vec<BuildRun>, repository: &str) -> Option<BuildRun> {
    let mut candidate: Option<BuildRun> = None;

    for run in runs {
        let Some(completed) = run.completion_time() else {
            continue;
        };

        if !run
            .embedded_spec()
            .is_some_and(|spec| references(spec, repository))
        {
            continue;
        }

        let newer = match candidate.as_ref().and_then(BuildRun::completion_time) {
            Some(current) => completed > current,
            None => true,
        };
        if newer {
            candidate = Some(run);
        }
    }

    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCluster, build, build_run, completed_build_run};

    const REPO: &str = "https://example.com/org/app";

    #[test]
    fn test_normalize_repository() {
        assert_eq!(normalize_repository("https://example.com/org/app.git"), REPO);
        assert_eq!(normalize_repository(REPO), REPO);
        assert_eq!(
            normalize_repository("https://example.com/org/app.git.git"),
            "https://example.com/org/app.git"
        );
    }

    #[tokio::test]
    async fn test_match_build_strips_git_suffix() {
        let cluster = MemoryCluster::new()
            .with_build(build("other", "https://example.com/org/other", "registry/other"))
            .with_build(build("app", REPO, "registry/app:latest"));

        let found = match_build(&cluster, "dev", "https://example.com/org/app.git")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.name(), "app");
    }

    #[tokio::test]
    async fn test_match_build_uses_substring_containment() {
        let cluster = MemoryCluster::new().with_build(build(
            "app",
            "https://example.com/org/app-service",
            "registry/app",
        ));

        let found = match_build(&cluster, "dev", REPO).await.unwrap();
        assert_eq!(found.unwrap().name(), "app");

        let missing = match_build(&cluster, "dev", "https://example.com/org/web")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_select_build_skips_non_git_sources() {
        let mut oci = build("oci", REPO, "registry/app");
        oci.spec.source.as_mut().unwrap().source_type =
            respin_core::domain::build::SourceType::Oci;

        let mut no_source = build("bare", REPO, "registry/app");
        no_source.spec.source = None;

        let mut empty_url = build("empty", "", "registry/app");
        empty_url.spec.source.as_mut().unwrap().git.as_mut().unwrap().url = String::new();

        let builds = vec![oci, no_source, empty_url];
        assert!(select_build(builds.clone(), REPO).is_none());

        let mut with_match = builds;
        with_match.push(build("app", REPO, "registry/app"));
        assert_eq!(select_build(with_match, REPO).unwrap().name(), "app");
    }

    #[test]
    fn test_select_build_run_picks_latest_completion() {
        let runs = vec![
            completed_build_run("first", REPO, "registry/app:v1", "2024-05-01T10:00:00Z"),
            completed_build_run("latest", REPO, "registry/app:v2", "2024-05-01T12:00:00Z"),
            completed_build_run("middle", REPO, "registry/app:v1", "2024-05-01T11:00:00Z"),
        ];

        assert_eq!(select_build_run(runs, REPO).unwrap().name(), "latest");
    }

    #[test]
    fn test_select_build_run_keeps_first_on_tie() {
        let runs = vec![
            completed_build_run("first", REPO, "registry/app:v1", "2024-05-01T12:00:00Z"),
            completed_build_run("second", REPO, "registry/app:v2", "2024-05-01T12:00:00Z"),
        ];

        assert_eq!(select_build_run(runs, REPO).unwrap().name(), "first");
    }

    #[test]
    fn test_select_build_run_ignores_unfinished_and_foreign_runs() {
        let runs = vec![
            build_run("running", REPO, "registry/app:v3"),
            completed_build_run(
                "foreign",
                "https://example.com/org/other",
                "registry/other",
                "2024-05-01T13:00:00Z",
            ),
        ];
        assert!(select_build_run(runs, REPO).is_none());

        let mut by_name = completed_build_run("by-name", REPO, "registry/app", "2024-05-01T13:00:00Z");
        by_name.spec.build.spec = None;
        by_name.spec.build.name = Some("app".to_string());
        assert!(select_build_run(vec![by_name], REPO).is_none());
    }

    #[tokio::test]
    async fn test_listing_failure_is_surfaced() {
        let cluster = MemoryCluster::new().failing_listings();

        assert!(match_build(&cluster, "dev", REPO).await.is_err());
        assert!(match_build_run(&cluster, "dev", REPO).await.is_err());
    }
}
