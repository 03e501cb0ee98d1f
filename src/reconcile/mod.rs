//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! interval tick
//!     → discovery (resolve pool)
//!     → canonicalize
//!     → render (or the empty document when the pool is empty)
//!     → compare with last applied document
//!         equal     → nothing
//!         different → store.persist → supervisor.stop → supervisor.start
//!
//! supervisor.wait_exit fires → fatal ProcessCrash
//! ```
//!
//! # Design Decisions
//! - All state is owned by one task; the process watcher only sends a oneshot
//! - Stop is confirmed (process reaped) before the next start
//! - Every error is fatal; there is no retry or backoff
//! - Timer is polled before process death when both are ready

pub mod reconciler;
pub mod state;

pub use reconciler::{Reconciler, TickOutcome};
pub use state::ReconcilerState;
