//! Respin Cluster Client
//!
//! A small, type-safe HTTP client for the parts of the Kubernetes API that Respin uses:
//! Shipwright Builds and BuildRuns, and Knative Services.
//!
//! # Example
//!
//! ```no_run
//! use respin_client::{ClusterClient, read_namespace, NAMESPACE_FILE};
//!
//! #[tokio::main]
//! async fn main() -> respin_client::Result<()> {
//!     let namespace = read_namespace(NAMESPACE_FILE).await?;
//!     let client = ClusterClient::in_cluster().await?;
//!
//!     for build in client.list_builds(&namespace).await? {
//!         println!("{} -> {}", build.name(), build.spec.output.image);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod build_runs;
mod builds;
mod services;

pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Directory holding the projected service account credentials
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// File holding the namespace the pod runs in
pub const NAMESPACE_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

const SHIPWRIGHT_GROUP_VERSION: &str = "shipwright.io/v1beta1";
const KNATIVE_SERVING_GROUP_VERSION: &str = "serving.knative.dev/v1";

/// HTTP client for the Kubernetes API server
#[derive(Debug, Clone)]
pub struct ClusterClient {
    /// Base URL of the API server (e.g., "https://10.96.0.1:443")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token sent with every request
    token: Option<String>,
}

impl ClusterClient {
    /// Create a client from the in-cluster environment
    ///
    /// Uses `KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT`, the service account
    /// token and the cluster CA bundle mounted into every pod.
    pub async fn in_cluster() -> Result<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST")
            .map_err(|_| ClientError::Config("KUBERNETES_SERVICE_HOST not set".to_string()))?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT")
            .map_err(|_| ClientError::Config("KUBERNETES_SERVICE_PORT not set".to_string()))?;

        // IPv6 service addresses need brackets in a URL
        let base_url = if host.contains(':') {
            format!("https://[{}]:{}", host, port)
        } else {
            format!("https://{}:{}", host, port)
        };

        let token = read_file(&format!("{}/token", SERVICE_ACCOUNT_DIR)).await?;
        let ca = read_file(&format!("{}/ca.crt", SERVICE_ACCOUNT_DIR)).await?;

        let certificate = reqwest::Certificate::from_pem(ca.as_bytes())
            .map_err(|e| ClientError::Config(format!("Invalid cluster CA bundle: {}", e)))?;
        let client = Client::builder()
            .add_root_certificate(certificate)
            .build()?;

        Ok(Self::with_client(base_url, client, Some(token.trim().to_string())))
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows you to point at a proxy (`kubectl proxy`) or configure TLS yourself.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API server
    /// * `client` - A configured reqwest Client
    /// * `token` - Bearer token, if the server requires one
    pub fn with_client(base_url: impl Into<String>, client: Client, token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token,
        }
    }

    /// Get the base URL of the API server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Reads the namespace the pod runs in
pub async fn read_namespace(path: &str) -> Result<String> {
    let namespace = read_file(path).await?.trim().to_string();
    if namespace.is_empty() {
        return Err(ClientError::Config(format!("{} is empty", path)));
    }
    Ok(namespace)
}

async fn read_file(path: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ClientError::Io {
            path: path.to_string(),
            source,
        })
}

/// Path of a namespaced resource collection, e.g. `/apis/shipwright.io/v1beta1/namespaces/dev/builds`
fn collection_path(group_version: &str, namespace: &str, plural: &str) -> String {
    format!("/apis/{}/namespaces/{}/{}", group_version, namespace, plural)
}

/// Path of a single namespaced resource
fn object_path(group_version: &str, namespace: &str, plural: &str, name: &str) -> String {
    format!("{}/{}", collection_path(group_version, namespace, plural), name)
}
