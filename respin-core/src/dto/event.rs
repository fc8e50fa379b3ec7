//! Source repository webhook payload

use serde::{Deserialize, Serialize};

/// Push notification sent by the source repository host
///
/// Only the fields the server reads are decoded; everything else in the payload is
/// ignored, whatever its shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    pub repository: Repository,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub clone_url: String,
}
