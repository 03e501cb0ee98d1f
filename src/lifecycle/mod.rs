//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → discovery source → template → store → supervisor
//!     → Reconciler::run
//!
//! Exit:
//!     Any fatal error → kill + reap proxy → non-zero exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No signal handling here; the outer process manager owns shutdown and restart

pub mod startup;
