//! Backend discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Reconcile tick
//!     → EndpointSource::resolve(pool)
//!     → kubernetes.rs (Endpoints object for pool/namespace)
//!     → filter by port name
//!     → Vec<Endpoint> (any order)
//!     → canonicalize() (sorted, deduplicated)
//! ```
//!
//! # Design Decisions
//! - An empty result is a valid pool with no members, not a failure
//! - Errors always carry pool and namespace for diagnostics
//! - Ordering is value-based so endpoint sets diff deterministically

pub mod endpoint;
pub mod kubeconfig;
pub mod kubernetes;

use std::future::Future;
use std::path::PathBuf;

pub use endpoint::{canonicalize, Endpoint};
pub use kubernetes::KubernetesSource;

/// Errors that can occur while resolving a pool.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Transport-level failure talking to the control plane.
    #[error("request for pool {pool} (namespace {namespace}) failed: {source}")]
    Request {
        pool: String,
        namespace: String,
        #[source]
        source: reqwest::Error,
    },

    /// The control plane answered with a non-success status.
    #[error("pool {pool} (namespace {namespace}) lookup returned HTTP {status}")]
    Status {
        pool: String,
        namespace: String,
        status: u16,
    },

    /// The response could not be interpreted.
    #[error("invalid endpoints for pool {pool} (namespace {namespace}): {reason}")]
    Invalid {
        pool: String,
        namespace: String,
        reason: String,
    },

    /// The bearer token could not be read for this request.
    #[error("pool {pool} (namespace {namespace}): failed to read token {path}: {source}")]
    Credentials {
        pool: String,
        namespace: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local setup (API server address, kubeconfig, CA bundle) is unusable.
    /// Only raised while building a source.
    #[error("discovery setup failed: {0}")]
    Setup(String),
}

/// A source of live backend endpoints for a named pool.
pub trait EndpointSource {
    /// Return the current members of `pool`. An empty vector means the pool
    /// exists but has no live members.
    fn resolve(
        &self,
        pool: &str,
    ) -> impl Future<Output = Result<Vec<Endpoint>, ResolutionError>> + Send;
}
