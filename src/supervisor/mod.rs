//! Process supervision subsystem.
//!
//! # State Machine
//! ```text
//! (none) --start()--> Running --exit on its own--> Stopped  (reported by wait_exit)
//!                        |
//!                        +--stop(): kill, await completion--> Stopped
//! ```
//!
//! # Design Decisions
//! - One background task per child awaits OS exit and publishes exactly one
//!   completion event on a oneshot channel
//! - The owner never considers a stop finished before that event arrives
//! - A second start is refused until the current child is confirmed reaped
//! - No restart policy here; unexpected exits are surfaced to the owner

pub mod process;

pub use process::{ExitOutcome, ProcessExit, ProcessSpec, ProcessSupervisor};

use std::path::PathBuf;

/// Errors raised by the supervisor.
#[derive(Debug, thiserror::Error)]
pub enum SuperviseError {
    /// The OS refused to launch the binary.
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A previous instance has not been confirmed dead yet.
    #[error("process {pid} is still running")]
    AlreadyRunning { pid: u32 },
}
