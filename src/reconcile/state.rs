//! State owned by the reconciliation loop.

use crate::render::ConfigDocument;
use crate::supervisor::ProcessSupervisor;

/// Last applied document plus the process slot.
///
/// Lives on the reconciliation task only; nothing else reads or mutates it.
pub struct ReconcilerState {
    pub last_applied: ConfigDocument,
    pub process: ProcessSupervisor,
}

impl ReconcilerState {
    /// Startup state: empty document, no process.
    pub fn new(process: ProcessSupervisor) -> Self {
        Self {
            last_applied: ConfigDocument::empty(),
            process,
        }
    }
}
