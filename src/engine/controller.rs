// src/engine/controller.rs

//! Single-run admission control and output draining.
//!
//! The controller is synchronous and never waits: `start` and `stop` return
//! immediately, and `drain` only takes what is already queued. The state
//! leaves `Running` exclusively by draining the run's `Completed` message.

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::engine::{CompletionStatus, OutputMessage, RunId, RunState};
use crate::errors::{Result, SupervisorError};
use crate::exec::{OutputReceiver, ProcessBackend, ProcessHandle, RunRequest};
use crate::sink::OutputSink;

/// Notice logged when a stop request is delivered.
pub const STOP_NOTICE: &str = "Stop requested; waiting for the downloader to exit.";

/// The run currently owned by the controller.
#[derive(Debug)]
struct ActiveRun {
    handle: ProcessHandle,
    output: OutputReceiver,
    stop_requested: bool,
}

/// What one call to [`Controller::drain`] observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Number of `Line` messages taken.
    pub lines: usize,
    /// Set when the run's terminal message was taken in this drain.
    pub completed: Option<CompletionStatus>,
}

/// Owns at most one run and the accumulated log of all runs.
#[derive(Debug)]
pub struct Controller<B: ProcessBackend, S: OutputSink> {
    backend: B,
    sink: S,
    active: Option<ActiveRun>,
    next_run_id: RunId,
    log: Vec<String>,
    last_status: Option<CompletionStatus>,
}

impl<B: ProcessBackend, S: OutputSink> Controller<B, S> {
    pub fn new(backend: B, sink: S) -> Self {
        Self {
            backend,
            sink,
            active: None,
            next_run_id: 1,
            log: Vec::new(),
            last_status: None,
        }
    }

    pub fn state(&self) -> RunState {
        if self.active.is_some() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the active run, if any.
    pub fn current_run(&self) -> Option<RunId> {
        self.active.as_ref().map(|run| run.handle.run_id())
    }

    /// Everything logged so far, in order, across runs.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Terminal status of the most recently completed run.
    pub fn last_status(&self) -> Option<&CompletionStatus> {
        self.last_status.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Launch a run. Only permitted while idle.
    ///
    /// On `Err` nothing was started and the state is unchanged.
    pub fn start(&mut self, request: RunRequest) -> Result<RunId> {
        if let Some(run) = &self.active {
            warn!(
                run_id = run.handle.run_id(),
                "start rejected: a download is already running"
            );
            return Err(SupervisorError::AlreadyRunning);
        }

        let run_id = self.next_run_id;
        let (handle, output) = self.backend.start(run_id, &request)?;
        self.next_run_id += 1;

        info!(run_id, pid = ?handle.pid(), "run started");

        self.push_line(format!("$ {}", request.display_command()));
        self.active = Some(ActiveRun {
            handle,
            output,
            stop_requested: false,
        });
        self.sink.state_changed(RunState::Running);

        Ok(run_id)
    }

    /// Request early termination of the active run.
    ///
    /// Does not change state; the run still ends through its `Completed`
    /// message. No-op while idle, and only the first request per run is sent.
    /// Returns whether a request was delivered.
    pub fn stop(&mut self) -> bool {
        let Some(run) = self.active.as_mut() else {
            debug!("stop ignored: no active run");
            return false;
        };

        if run.stop_requested {
            debug!(run_id = run.handle.run_id(), "stop already requested");
            return false;
        }
        run.stop_requested = true;

        let delivered = run.handle.terminate();
        if delivered {
            info!(run_id = run.handle.run_id(), "stop requested");
            self.push_line(STOP_NOTICE.to_string());
        }
        delivered
    }

    /// Take every message currently queued for the active run, without
    /// blocking.
    ///
    /// Lines go to the log and the sink in arrival order. On `Completed` the
    /// summary is logged, the controller returns to idle and nothing more is
    /// read from that run's channel.
    pub fn drain(&mut self) -> DrainOutcome {
        let mut outcome = DrainOutcome::default();

        let Some(run) = self.active.as_mut() else {
            return outcome;
        };

        loop {
            match run.output.try_recv() {
                Ok(OutputMessage::Line(text)) => {
                    outcome.lines += 1;
                    self.sink.line(&text);
                    self.log.push(text);
                }
                Ok(OutputMessage::Completed(status)) => {
                    outcome.completed = Some(status);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!(
                        run_id = run.handle.run_id(),
                        "output channel closed without a completion message"
                    );
                    outcome.completed = Some(CompletionStatus::LaunchOrIoError(
                        "output stream ended before the run completed".to_string(),
                    ));
                    break;
                }
            }
        }

        if let Some(status) = &outcome.completed {
            self.finish_run(status.clone());
        }

        outcome
    }

    fn finish_run(&mut self, status: CompletionStatus) {
        let run_id = self.active.take().map(|run| run.handle.run_id());
        info!(?run_id, status = ?status, "run completed");

        let summary = status.summary();
        self.sink.summary(&summary);
        self.log.push(summary);
        self.last_status = Some(status);
        self.sink.state_changed(RunState::Idle);
    }

    fn push_line(&mut self, text: String) {
        self.sink.line(&text);
        self.log.push(text);
    }
}
