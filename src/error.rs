//! Top-level controller errors.
//!
//! Every variant is fatal: the controller stops its process and exits
//! non-zero, leaving restart policy to whatever supervises the sidecar.

use thiserror::Error;

use crate::discovery::ResolutionError;
use crate::render::RenderError;
use crate::store::PersistError;
use crate::supervisor::{ExitOutcome, SuperviseError};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("endpoint resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("config render failed: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("process start failed: {0}")]
    ProcessStart(#[from] SuperviseError),

    /// The supervised process exited without being asked to.
    #[error("supervised process {pid} died: {outcome}")]
    ProcessCrash { pid: u32, outcome: ExitOutcome },
}
