//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → command-line / environment overrides (args.rs)
//!     → validation.rs (semantic checks)
//!     → SidecarConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is fixed at startup; the poll interval never changes at runtime
//! - All fields have defaults so the sidecar runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{resolve_config, ConfigError};
pub use schema::SidecarConfig;
pub use schema::DiscoveryConfig;
pub use schema::ProxyConfig;
pub use schema::ReconcileConfig;
