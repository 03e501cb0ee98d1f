//! Kubernetes Endpoints lookup.
//!
//! # Responsibilities
//! - Locate the API server (explicit URL, kubeconfig, or in-cluster environment)
//! - Fetch the `Endpoints` object named after the pool
//! - Select the addresses serving the configured port name

use std::io::ErrorKind;
use std::net::IpAddr;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use url::Url;

use crate::config::DiscoveryConfig;
use crate::discovery::kubeconfig::{self, ClusterAccess, Credential};
use crate::discovery::{Endpoint, EndpointSource, ResolutionError};

/// Resolves pools from `Endpoints` objects of a single namespace.
#[derive(Debug)]
pub struct KubernetesSource {
    client: reqwest::Client,
    api_server: Url,
    namespace: String,
    port_name: String,
    token: Credential,
}

impl KubernetesSource {
    /// Build a source from the discovery settings.
    ///
    /// The API server is `api_server` if set, else the kubeconfig's current
    /// context, else the in-cluster service environment
    /// (`KUBERNETES_SERVICE_HOST`, `KUBERNETES_SERVICE_PORT`). With a
    /// kubeconfig its CA and credentials are used even when `api_server`
    /// overrides the address.
    pub fn new(config: &DiscoveryConfig) -> Result<Self, ResolutionError> {
        let access = config.kubeconfig.as_deref().map(kubeconfig::load).transpose()?;

        let api_server = match (&config.api_server, &access) {
            (Some(url), _) => parse_api_server(url)?,
            (None, Some(access)) => parse_api_server(&access.server)?,
            (None, None) => in_cluster_url()?,
        };

        // The API server is always reached directly, never through HTTP_PROXY.
        let builder = reqwest::Client::builder().no_proxy();
        let builder = match &access {
            Some(access) => with_kubeconfig_tls(builder, access)?,
            None => with_ca_file(builder, config)?,
        };
        let client = builder
            .build()
            .map_err(|e| ResolutionError::Setup(format!("failed to build HTTP client: {e}")))?;

        let token = match access {
            Some(access) => access.credential,
            None => Credential::TokenFile(config.token_path.clone()),
        };

        tracing::info!(
            api_server = %api_server,
            namespace = %config.namespace,
            port_name = %config.port_name,
            kubeconfig = config.kubeconfig.is_some(),
            "Kubernetes endpoint source ready"
        );

        Ok(Self {
            client,
            api_server,
            namespace: config.namespace.clone(),
            port_name: config.port_name.clone(),
            token,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn endpoints_url(&self, pool: &str) -> Result<Url, ResolutionError> {
        let mut url = self.api_server.clone();
        url.path_segments_mut()
            .map_err(|_| ResolutionError::Invalid {
                pool: pool.to_string(),
                namespace: self.namespace.clone(),
                reason: format!("API server URL cannot be a base: {}", self.api_server),
            })?
            .pop_if_empty()
            .extend(["api", "v1", "namespaces", self.namespace.as_str(), "endpoints", pool]);
        Ok(url)
    }

    /// Token files rotate, so they are re-read on every request. A missing
    /// file means no credentials.
    async fn bearer_token(&self, pool: &str) -> Result<Option<String>, ResolutionError> {
        match &self.token {
            Credential::None => Ok(None),
            Credential::Token(token) => Ok(Some(token.clone())),
            Credential::TokenFile(path) => match tokio::fs::read_to_string(path).await {
                Ok(token) => Ok(Some(token.trim().to_string())),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(source) => Err(ResolutionError::Credentials {
                    pool: pool.to_string(),
                    namespace: self.namespace.clone(),
                    path: path.clone(),
                    source,
                }),
            },
        }
    }
}

fn parse_api_server(url: &str) -> Result<Url, ResolutionError> {
    let parsed =
        Url::parse(url).map_err(|e| ResolutionError::Setup(format!("invalid API server URL {url}: {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(ResolutionError::Setup(format!("API server URL cannot be a base: {url}")));
    }
    Ok(parsed)
}

fn with_ca_file(
    builder: reqwest::ClientBuilder,
    config: &DiscoveryConfig,
) -> Result<reqwest::ClientBuilder, ResolutionError> {
    match std::fs::read(&config.ca_path) {
        Ok(pem) => add_ca(builder, &pem, &config.ca_path.display().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %config.ca_path.display(), "No cluster CA bundle, using system roots");
            Ok(builder)
        }
        Err(e) => Err(ResolutionError::Setup(format!(
            "failed to read CA bundle {}: {e}",
            config.ca_path.display()
        ))),
    }
}

fn with_kubeconfig_tls(
    builder: reqwest::ClientBuilder,
    access: &ClusterAccess,
) -> Result<reqwest::ClientBuilder, ResolutionError> {
    let builder = match &access.ca_pem {
        Some(pem) => add_ca(builder, pem, "from kubeconfig")?,
        None => builder,
    };
    if access.insecure_skip_tls_verify {
        tracing::warn!(server = %access.server, "kubeconfig disables TLS verification");
        return Ok(builder.danger_accept_invalid_certs(true));
    }
    Ok(builder)
}

fn add_ca(
    builder: reqwest::ClientBuilder,
    pem: &[u8],
    origin: &str,
) -> Result<reqwest::ClientBuilder, ResolutionError> {
    let cert = reqwest::Certificate::from_pem(pem)
        .map_err(|e| ResolutionError::Setup(format!("invalid CA bundle {origin}: {e}")))?;
    Ok(builder.add_root_certificate(cert))
}

impl EndpointSource for KubernetesSource {
    async fn resolve(&self, pool: &str) -> Result<Vec<Endpoint>, ResolutionError> {
        let url = self.endpoints_url(pool)?;
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = self.bearer_token(pool).await? {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let request_error = |source| ResolutionError::Request {
            pool: pool.to_string(),
            namespace: self.namespace.clone(),
            source,
        };

        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Status {
                pool: pool.to_string(),
                namespace: self.namespace.clone(),
                status: status.as_u16(),
            });
        }

        let object: EndpointsObject = response.json().await.map_err(request_error)?;
        let endpoints = endpoints_from_object(&object, &self.port_name).map_err(|reason| {
            ResolutionError::Invalid {
                pool: pool.to_string(),
                namespace: self.namespace.clone(),
                reason,
            }
        })?;

        tracing::debug!(pool = %pool, count = endpoints.len(), "Resolved endpoints");
        Ok(endpoints)
    }
}

fn in_cluster_url() -> Result<Url, ResolutionError> {
    let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
        ResolutionError::Setup("KUBERNETES_SERVICE_HOST is not set and no api_server is configured".into())
    })?;
    let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());
    let host = if host.contains(':') { format!("[{host}]") } else { host };

    Url::parse(&format!("https://{host}:{port}"))
        .map_err(|e| ResolutionError::Setup(format!("invalid in-cluster API server address: {e}")))
}

/// Subset of the core/v1 `Endpoints` schema that discovery reads.
#[derive(Debug, Deserialize)]
pub(crate) struct EndpointsObject {
    #[serde(default)]
    subsets: Option<Vec<EndpointSubset>>,
}

#[derive(Debug, Deserialize)]
struct EndpointSubset {
    #[serde(default)]
    addresses: Option<Vec<EndpointAddress>>,
    #[serde(default)]
    ports: Option<Vec<EndpointPort>>,
}

#[derive(Debug, Deserialize)]
struct EndpointAddress {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct EndpointPort {
    #[serde(default)]
    name: Option<String>,
    port: u16,
}

/// Collect the ready addresses of every subset that exposes `port_name`.
pub(crate) fn endpoints_from_object(
    object: &EndpointsObject,
    port_name: &str,
) -> Result<Vec<Endpoint>, String> {
    let mut endpoints = Vec::new();

    for subset in object.subsets.iter().flatten() {
        let port = subset
            .ports
            .iter()
            .flatten()
            .find(|p| p.name.as_deref() == Some(port_name))
            .map(|p| p.port);

        let Some(port) = port else {
            tracing::warn!(port_name = %port_name, "Endpoint subset has no matching port, skipping");
            continue;
        };

        for address in subset.addresses.iter().flatten() {
            let ip = address
                .ip
                .parse::<IpAddr>()
                .map_err(|e| format!("invalid address {:?}: {e}", address.ip))?;
            endpoints.push(Endpoint::new(ip, port));
        }
    }

    Ok(endpoints)
}
