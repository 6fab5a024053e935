// src/exec/handle.rs

//! Ownership of one live external process, as seen by the controller.

use tokio::sync::oneshot;
use tracing::debug;

use crate::engine::RunId;

/// Opaque handle to a launched process.
///
/// The process itself is owned by the background task that reads its output
/// and reaps it; the handle only carries the request to stop it. Dropping the
/// handle does not stop the process.
#[derive(Debug)]
pub struct ProcessHandle {
    run_id: RunId,
    pid: Option<u32>,
    terminate_tx: Option<oneshot::Sender<()>>,
}

impl ProcessHandle {
    /// Handle for a process whose background task listens on the receiving
    /// half of `terminate_tx`.
    pub fn new(run_id: RunId, pid: Option<u32>, terminate_tx: oneshot::Sender<()>) -> Self {
        Self {
            run_id,
            pid,
            terminate_tx: Some(terminate_tx),
        }
    }

    /// Handle for a run that never got a process (spawn failed).
    pub fn detached(run_id: RunId) -> Self {
        Self {
            run_id,
            pid: None,
            terminate_tx: None,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether a termination request can still be delivered.
    pub fn is_live(&self) -> bool {
        self.terminate_tx
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Ask the process to terminate and return immediately.
    ///
    /// Only the first call has any effect; calls after the process has exited
    /// are no-ops. Returns whether a request was actually delivered.
    pub fn terminate(&mut self) -> bool {
        let Some(tx) = self.terminate_tx.take() else {
            debug!(run_id = self.run_id, "terminate: no live process");
            return false;
        };

        match tx.send(()) {
            Ok(()) => {
                debug!(run_id = self.run_id, pid = ?self.pid, "termination requested");
                true
            }
            Err(()) => {
                debug!(run_id = self.run_id, "terminate: process already exited");
                false
            }
        }
    }
}
