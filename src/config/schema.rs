//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sidecar.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the sidecar controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SidecarConfig {
    /// Where backend membership comes from.
    pub discovery: DiscoveryConfig,

    /// Template used to render the proxy configuration.
    pub template: TemplateConfig,

    /// The supervised proxy process.
    pub proxy: ProxyConfig,

    /// Reconciliation loop timing.
    pub reconcile: ReconcileConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Logical pool name (the Kubernetes Endpoints object to read).
    pub pool: String,

    /// Namespace holding the pool.
    pub namespace: String,

    /// Only ports with this name are used.
    pub port_name: String,

    /// Explicit API server URL (e.g. "http://127.0.0.1:8001" behind kubectl proxy).
    /// When unset, the kubeconfig or the in-cluster service environment is used.
    pub api_server: Option<String>,

    /// Kubeconfig for running outside the cluster. Its current context
    /// supplies the server, CA and token; `api_server` still wins for the address.
    pub kubeconfig: Option<PathBuf>,

    /// Bearer token file, read on every request when present.
    pub token_path: PathBuf,

    /// Cluster CA bundle (PEM), trusted when present.
    pub ca_path: PathBuf,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            pool: "memcached".to_string(),
            namespace: "default".to_string(),
            port_name: "memcached".to_string(),
            api_server: None,
            kubeconfig: None,
            token_path: PathBuf::from("/var/run/secrets/kubernetes.io/serviceaccount/token"),
            ca_path: PathBuf::from("/var/run/secrets/kubernetes.io/serviceaccount/ca.crt"),
        }
    }
}

/// Template configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Path to the handlebars template file.
    pub path: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/etc/twemproxy/template.yaml"),
        }
    }
}

/// Supervised proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy binary to launch.
    pub binary: PathBuf,

    /// Fixed flags passed before the config path.
    pub args: Vec<String>,

    /// Where the rendered configuration is written.
    pub config_path: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("/usr/sbin/nutcracker"),
            args: vec!["-v".to_string(), "11".to_string(), "-c".to_string()],
            config_path: PathBuf::from("/etc/twemproxy/config.yaml"),
        }
    }
}

/// Reconciliation timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Poll interval in seconds.
    pub interval_secs: u64,
}

impl ReconcileConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
