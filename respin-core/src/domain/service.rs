//! Serverless revision service types (Knative `Service`)

use serde::{Deserialize, Serialize};

use crate::domain::meta::{Extra, ObjectMeta};

pub const API_VERSION: &str = "serving.knative.dev/v1";
pub const KIND: &str = "Service";

/// Annotation naming the image a service was deployed from
pub const USER_IMAGE_ANNOTATION: &str = "client.knative.dev/user-image";

/// Template annotation whose change forces a new revision
pub const UPDATE_TIMESTAMP_ANNOTATION: &str = "client.knative.dev/updateTimestamp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ServiceSpec,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    #[serde(default)]
    pub template: RevisionTemplate,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Template every new revision is stamped from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Service {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Image this service was deployed from, as recorded by the Knative client
    pub fn user_image(&self) -> Option<&str> {
        self.metadata.annotation(USER_IMAGE_ANNOTATION)
    }

    /// Fills in `apiVersion`/`kind` when the list response omitted them
    pub fn ensure_type_meta(&mut self) {
        if self.api_version.is_empty() {
            self.api_version = API_VERSION.to_string();
        }
        if self.kind.is_empty() {
            self.kind = KIND.to_string();
        }
    }
}
