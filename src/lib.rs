//! Endpoint-driven proxy sidecar.
//!
//! Watches a backend pool, re-renders the proxy configuration when the
//! membership changes and replaces the proxy process accordingly.

// Core subsystems
pub mod config;
pub mod discovery;
pub mod reconcile;
pub mod render;
pub mod store;
pub mod supervisor;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::SidecarConfig;
pub use error::ControllerError;
pub use reconcile::{Reconciler, TickOutcome};
