//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::SidecarConfig;

#[derive(Debug, Parser)]
#[command(name = "endpoint-sidecar")]
#[command(about = "Regenerates a proxy config from pool membership and supervises the proxy", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Template used to render the proxy configuration
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Where the rendered configuration is written
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Proxy binary to supervise
    #[arg(long, alias = "twemproxy")]
    pub proxy_binary: Option<PathBuf>,

    /// Name of the service port to select
    #[arg(long)]
    pub port_name: Option<String>,

    /// Poll interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Kubernetes API server URL (defaults to the in-cluster service)
    #[arg(long)]
    pub api_server: Option<String>,

    /// Kubeconfig to use outside the cluster
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace of the pool
    #[arg(long, env = "KUBE_NAMESPACE")]
    pub namespace: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,

    /// Pool (Endpoints object) to follow
    pub pool: Option<String>,
}

impl Args {
    /// Overlay every explicitly given value onto `config`.
    pub fn apply(self, config: &mut SidecarConfig) {
        if let Some(template) = self.template {
            config.template.path = template;
        }
        if let Some(output) = self.output {
            config.proxy.config_path = output;
        }
        if let Some(binary) = self.proxy_binary {
            config.proxy.binary = binary;
        }
        if let Some(port_name) = self.port_name {
            config.discovery.port_name = port_name;
        }
        if let Some(interval) = self.interval {
            config.reconcile.interval_secs = interval;
        }
        if let Some(api_server) = self.api_server {
            config.discovery.api_server = Some(api_server);
        }
        if let Some(kubeconfig) = self.kubeconfig {
            config.discovery.kubeconfig = Some(kubeconfig);
        }
        // An empty KUBE_NAMESPACE means "unset".
        if let Some(namespace) = self.namespace.filter(|ns| !ns.is_empty()) {
            config.discovery.namespace = namespace;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(pool) = self.pool {
            config.discovery.pool = pool;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_keeps_defaults() {
        let mut config = SidecarConfig::default();
        Args::try_parse_from(["endpoint-sidecar"]).unwrap().apply(&mut config);
        assert_eq!(config.discovery.pool, "memcached");
        assert_eq!(config.reconcile.interval_secs, 10);
    }

    #[test]
    fn test_flags_override() {
        let mut config = SidecarConfig::default();
        Args::try_parse_from([
            "endpoint-sidecar",
            "--output",
            "/tmp/out.yaml",
            "--interval",
            "5",
            "--namespace",
            "cache",
            "sessions",
        ])
        .unwrap()
        .apply(&mut config);

        assert_eq!(config.proxy.config_path, PathBuf::from("/tmp/out.yaml"));
        assert_eq!(config.reconcile.interval_secs, 5);
        assert_eq!(config.discovery.namespace, "cache");
        assert_eq!(config.discovery.pool, "sessions");
    }

    #[test]
    fn test_twemproxy_alias_and_kubeconfig() {
        let mut config = SidecarConfig::default();
        Args::try_parse_from([
            "endpoint-sidecar",
            "--twemproxy",
            "/opt/bin/nutcracker",
            "--kubeconfig",
            "/home/dev/.kube/config",
        ])
        .unwrap()
        .apply(&mut config);

        assert_eq!(config.proxy.binary, PathBuf::from("/opt/bin/nutcracker"));
        assert_eq!(config.discovery.kubeconfig, Some(PathBuf::from("/home/dev/.kube/config")));
        assert_eq!(config.discovery.api_server, None);
    }

    #[test]
    fn test_empty_namespace_is_ignored() {
        let mut config = SidecarConfig::default();
        Args::try_parse_from(["endpoint-sidecar", "--namespace", ""])
            .unwrap()
            .apply(&mut config);
        assert_eq!(config.discovery.namespace, "default");
    }
}
