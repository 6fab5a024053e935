// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::controller::Controller;
use crate::engine::CompletionStatus;
use crate::errors::Result;
use crate::exec::{ProcessBackend, RunRequest};
use crate::sink::OutputSink;

/// Default drain cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(120);

/// Requests flowing into the runtime from outside (Ctrl-C, tests, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Stop the active download.
    StopRequested,
}

/// Options for the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// How often the output channel is drained.
    pub poll_interval: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Drives a [`Controller`] for one run.
///
/// This is a thin IO shell: the controller holds all run semantics, the
/// runtime only supplies the polling clock and forwards control events.
pub struct Runtime<B: ProcessBackend, S: OutputSink> {
    controller: Controller<B, S>,
    control_rx: mpsc::UnboundedReceiver<ControlEvent>,
    options: RuntimeOptions,
}

impl<B: ProcessBackend, S: OutputSink> fmt::Debug for Runtime<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.controller.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend, S: OutputSink> Runtime<B, S> {
    pub fn new(
        controller: Controller<B, S>,
        control_rx: mpsc::UnboundedReceiver<ControlEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            controller,
            control_rx,
            options,
        }
    }

    pub fn controller(&self) -> &Controller<B, S> {
        &self.controller
    }

    pub fn into_controller(self) -> Controller<B, S> {
        self.controller
    }

    /// Start `request` and drive it until its terminal message is drained.
    ///
    /// Errors are the synchronous start failures (already running, no
    /// runtime); every run outcome, good or bad, is an `Ok` status.
    pub async fn run(&mut self, request: RunRequest) -> Result<CompletionStatus> {
        let run_id = self.controller.start(request)?;
        info!(run_id, poll_ms = self.options.poll_interval.as_millis() as u64, "runtime driving run");

        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut control_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.controller.drain();
                    if outcome.lines > 0 {
                        debug!(run_id, lines = outcome.lines, "drained output");
                    }
                    if let Some(status) = outcome.completed {
                        info!(run_id, status = ?status, "runtime finished");
                        return Ok(status);
                    }
                }
                event = self.control_rx.recv(), if control_open => match event {
                    Some(ControlEvent::StopRequested) => {
                        self.controller.stop();
                    }
                    None => {
                        debug!("control channel closed");
                        control_open = false;
                    }
                },
            }
        }
    }
}
