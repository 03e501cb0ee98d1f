//! Kubeconfig reader for running outside the cluster.
//!
//! Only the current context is used: its cluster's server and CA, and its
//! user's bearer token. Client certificates and exec plugins are not
//! supported. The context namespace is ignored; the namespace always comes
//! from the sidecar configuration.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::discovery::ResolutionError;

/// Connection details taken from the current context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAccess {
    pub server: String,
    /// PEM bundle to trust, from inline data or a file.
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub credential: Credential,
}

/// How requests authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    None,
    Token(String),
    /// Relative paths are already resolved against the kubeconfig directory.
    TokenFile(PathBuf),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::None => f.write_str("None"),
            Credential::Token(_) => f.write_str("Token(<redacted>)"),
            Credential::TokenFile(path) => f.debug_tuple("TokenFile").field(path).finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    #[serde(default)]
    current_context: Option<String>,
    #[serde(default)]
    clusters: Option<Vec<NamedCluster>>,
    #[serde(default)]
    contexts: Option<Vec<NamedContext>>,
    #[serde(default)]
    users: Option<Vec<NamedUser>>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: Cluster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    server: String,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    certificate_authority: Option<PathBuf>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: Context,
}

#[derive(Debug, Deserialize)]
struct Context {
    cluster: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct User {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    token_file: Option<PathBuf>,
    #[serde(default)]
    client_certificate_data: Option<String>,
    #[serde(default)]
    client_certificate: Option<PathBuf>,
    #[serde(default)]
    exec: Option<serde_yaml::Value>,
}

/// Read `path` and extract the current context's cluster access.
pub fn load(path: &Path) -> Result<ClusterAccess, ResolutionError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| setup(path, format!("failed to read: {e}")))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse(&content, base).map_err(|reason| setup(path, reason))
}

fn setup(path: &Path, reason: String) -> ResolutionError {
    ResolutionError::Setup(format!("kubeconfig {}: {reason}", path.display()))
}

/// Parse kubeconfig text; relative file references resolve against `base`.
fn parse(content: &str, base: &Path) -> Result<ClusterAccess, String> {
    let config: Kubeconfig = serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;

    let context_name = config
        .current_context
        .filter(|name| !name.is_empty())
        .ok_or("no current-context set")?;
    let context = config
        .contexts
        .iter()
        .flatten()
        .find(|c| c.name == context_name)
        .map(|c| &c.context)
        .ok_or_else(|| format!("context {context_name:?} not found"))?;
    let cluster = config
        .clusters
        .iter()
        .flatten()
        .find(|c| c.name == context.cluster)
        .map(|c| &c.cluster)
        .ok_or_else(|| format!("cluster {:?} not found", context.cluster))?;

    let ca_pem = match (&cluster.certificate_authority_data, &cluster.certificate_authority) {
        (Some(data), _) => Some(
            STANDARD
                .decode(data.trim())
                .map_err(|e| format!("invalid certificate-authority-data: {e}"))?,
        ),
        (None, Some(file)) => {
            let file = base.join(file);
            Some(std::fs::read(&file).map_err(|e| format!("failed to read CA {}: {e}", file.display()))?)
        }
        (None, None) => None,
    };

    let credential = match context.user.as_deref().filter(|name| !name.is_empty()) {
        None => Credential::None,
        Some(user_name) => {
            let user = config
                .users
                .iter()
                .flatten()
                .find(|u| u.name == user_name)
                .ok_or_else(|| format!("user {user_name:?} not found"))?;
            credential(user_name, user.user.as_ref().unwrap_or(&User::default()), base)?
        }
    };

    Ok(ClusterAccess {
        server: cluster.server.clone(),
        ca_pem,
        insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
        credential,
    })
}

fn credential(name: &str, user: &User, base: &Path) -> Result<Credential, String> {
    if let Some(token) = user.token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(Credential::Token(token.to_string()));
    }
    if let Some(file) = &user.token_file {
        return Ok(Credential::TokenFile(base.join(file)));
    }
    if user.exec.is_some() || user.client_certificate.is_some() || user.client_certificate_data.is_some() {
        return Err(format!(
            "user {name:?} authenticates with a client certificate or exec plugin; only tokens are supported"
        ));
    }
    Ok(Credential::None)
}
