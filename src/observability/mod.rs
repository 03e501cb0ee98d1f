//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! reconcile / supervisor / discovery produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges via the metrics facade)
//!
//! Consumers:
//!     → stderr log lines for the operator
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (pool, pid, path) on every lifecycle event
//! - No exporter is installed: the sidecar exposes no network API
//! - Metric updates are no-ops until a recorder exists

pub mod logging;
pub mod metrics;
