//! Object metadata shared by all cluster resources

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields of a resource that are not modelled explicitly
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Standard object metadata (`metadata` block)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Prefix the API server uses to generate a unique name on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Opaque version used by the API server for optimistic concurrency on update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl ObjectMeta {
    /// Metadata for a new object with a fixed name
    pub fn named(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Metadata for a new object whose name is generated by the API server
    pub fn generated(prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            generate_name: Some(prefix.into()),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Looks up a single annotation
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// Body of a list response (`{"items": [...]}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
