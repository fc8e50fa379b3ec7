//! Build execution types (Shipwright `BuildRun`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::build::{API_VERSION, Build, BuildSpec};
use crate::domain::meta::{Extra, ObjectMeta};

pub const KIND: &str = "BuildRun";

/// Condition type reporting the final outcome of a run
pub const SUCCEEDED: &str = "Succeeded";

/// One concrete run of a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRun {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BuildRunSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BuildRunStatus>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Specification of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRunSpec {
    #[serde(default)]
    pub build: ReferencedBuild,

    /// Maximum run time, Go duration text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// The build a run executes: a reference by name or an embedded spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedBuild {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<BuildSpec>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRunStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,

    pub status: ConditionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default)]
    pub message: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[serde(other)]
    Unknown,
}

impl BuildRun {
    /// A new run that executes the given build by reference
    ///
    /// The API server generates the final name from `rebuild-{build}-`.
    pub fn for_build(build: &Build) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta::generated(format!("rebuild-{}-", build.name()), build.namespace()),
            spec: BuildRunSpec {
                build: ReferencedBuild {
                    name: Some(build.name().to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
            status: None,
            extra: Extra::new(),
        }
    }

    /// A new run carrying a full copy of this run's spec under a new name
    pub fn resubmission(&self, name: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta::named(name, self.namespace()),
            spec: self.spec.clone(),
            status: None,
            extra: Extra::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Build spec embedded in the run, if any
    pub fn embedded_spec(&self) -> Option<&BuildSpec> {
        self.spec.build.spec.as_ref()
    }

    /// Looks up a status condition by type
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.status
            .as_ref()?
            .conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    pub fn completion_time(&self) -> Option<DateTime<Utc>> {
        self.status.as_ref().and_then(|s| s.completion_time)
    }
}
