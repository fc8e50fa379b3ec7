//! Server configuration
//!
//! Defines the listener address, the build run polling parameters, the concurrency
//! bound for background rebuilds and the optional webhook secret.

use respin_client::NAMESPACE_FILE;
use std::net::SocketAddr;
use std::time::Duration;

use crate::service::timeout::DEFAULT_BUILD_RUN_TIMEOUT;
use crate::service::waiter::DEFAULT_POLL_INTERVAL;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the webhook listener binds to
    pub bind_addr: String,

    /// How often a created build run is fetched while waiting for it
    pub poll_interval: Duration,

    /// Wait limit when neither the build run nor its build sets a timeout
    pub default_build_run_timeout: Duration,

    /// Maximum number of rebuilds doing work at the same time
    pub max_concurrent_rebuilds: usize,

    /// File holding the namespace the server operates in
    pub namespace_file: String,

    /// Shared secret for `X-Hub-Signature-256` validation
    pub webhook_secret: Option<String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(bind_addr: String) -> Self {
        Self {
            bind_addr,
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_build_run_timeout: DEFAULT_BUILD_RUN_TIMEOUT,
            max_concurrent_rebuilds: 16,
            namespace_file: NAMESPACE_FILE.to_string(),
            webhook_secret: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - POLL_INTERVAL (optional, seconds, default: 10)
    /// - DEFAULT_BUILD_RUN_TIMEOUT (optional, seconds, default: 600)
    /// - MAX_CONCURRENT_REBUILDS (optional, default: 16)
    /// - NAMESPACE_FILE (optional, default: service account namespace file)
    /// - WEBHOOK_SECRET (optional, enables signature validation)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let poll_interval = std::env::var("POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let default_build_run_timeout = std::env::var("DEFAULT_BUILD_RUN_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_build_run_timeout);

        let max_concurrent_rebuilds = std::env::var("MAX_CONCURRENT_REBUILDS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_concurrent_rebuilds);

        let namespace_file =
            std::env::var("NAMESPACE_FILE").unwrap_or(defaults.namespace_file);

        let webhook_secret = std::env::var("WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            bind_addr,
            poll_interval,
            default_build_run_timeout,
            max_concurrent_rebuilds,
            namespace_file,
            webhook_secret,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("bind_addr must be a socket address, got {:?}", self.bind_addr);
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.default_build_run_timeout.is_zero() {
            anyhow::bail!("default_build_run_timeout must be greater than 0");
        }

        if self.max_concurrent_rebuilds == 0 {
            anyhow::bail!("max_concurrent_rebuilds must be greater than 0");
        }

        if self.namespace_file.is_empty() {
            anyhow::bail!("namespace_file cannot be empty");
        }

        if self.webhook_secret.as_deref() == Some("") {
            anyhow::bail!("webhook_secret cannot be empty when set");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("0.0.0.0:8080".to_string())
    }
}
