//! Build definition types (Shipwright `Build`)

use serde::{Deserialize, Serialize};

use crate::domain::meta::{Extra, ObjectMeta};

pub const API_VERSION: &str = "shipwright.io/v1beta1";

/// A build definition: which repository to build and where the image goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BuildSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Build {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }
}

/// Build specification, shared by `Build` and by BuildRuns that embed one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    #[serde(default)]
    pub output: Output,

    /// Maximum run time, Go duration text (e.g. `10m0s`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl BuildSpec {
    /// URL of the git source, if the source is a non-empty git repository
    pub fn git_url(&self) -> Option<&str> {
        let source = self.source.as_ref()?;
        if source.source_type != SourceType::Git {
            return None;
        }

        source
            .git
            .as_ref()
            .map(|git| git.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Where the sources of a build come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: SourceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSource>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Kind of build source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    Git,
    #[serde(rename = "OCI")]
    Oci,
    Local,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    #[serde(default)]
    pub url: String,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Output image of a build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    #[serde(default)]
    pub image: String,

    #[serde(flatten)]
    pub extra: Extra,
}
