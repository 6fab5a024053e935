use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use ytdlp_supervisor::engine::{CompletionStatus, OutputMessage, RunId};
use ytdlp_supervisor::errors::{Result, SupervisorError};
use ytdlp_supervisor::exec::{OutputReceiver, ProcessBackend, ProcessHandle, RunRequest};

/// Test-side control over one fake run.
pub struct FakeRun {
    pub run_id: RunId,
    pub request: RunRequest,
    output: mpsc::UnboundedSender<OutputMessage>,
    terminate: oneshot::Receiver<()>,
}

impl FakeRun {
    pub fn line(&self, text: &str) {
        let _ = self.output.send(OutputMessage::Line(text.to_string()));
    }

    pub fn complete(&self, status: CompletionStatus) {
        let _ = self.output.send(OutputMessage::Completed(status));
    }

    /// Whether the controller asked this run to terminate (consumes the signal).
    pub fn terminate_requested(&mut self) -> bool {
        self.terminate.try_recv().is_ok()
    }
}

/// A backend that:
/// - records every request it was asked to start
/// - hands the producer side of each run to the test via [`FakeBackend::runs`]
/// - rejects programs marked missing, like the real backend's lookup
#[derive(Clone, Default)]
pub struct FakeBackend {
    runs: Arc<Mutex<Vec<FakeRun>>>,
    missing: Vec<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `program` as not installed.
    pub fn without_program(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    /// Shared list of started runs, oldest first.
    pub fn runs(&self) -> Arc<Mutex<Vec<FakeRun>>> {
        Arc::clone(&self.runs)
    }

    pub fn started(&self) -> usize {
        self.runs.lock().unwrap().len()
    }
}

impl ProcessBackend for FakeBackend {
    fn start(&mut self, run_id: RunId, request: &RunRequest) -> Result<(ProcessHandle, OutputReceiver)> {
        if self.missing.iter().any(|p| p == request.program()) {
            return Err(SupervisorError::ExecutableNotFound(
                request.program().to_string(),
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (term_tx, term_rx) = oneshot::channel();

        self.runs.lock().unwrap().push(FakeRun {
            run_id,
            request: request.clone(),
            output: tx,
            terminate: term_rx,
        });

        Ok((ProcessHandle::new(run_id, None, term_tx), rx))
    }
}
