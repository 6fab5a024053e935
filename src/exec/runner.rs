// src/exec/runner.rs

//! Launching one external process and streaming its output.

use std::io;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, anyhow};
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::engine::{CompletionStatus, OutputMessage, RunId};
use crate::errors::{Result, SupervisorError};
use crate::exec::handle::ProcessHandle;
use crate::exec::lines::pump_lines;
use crate::exec::request::RunRequest;
use crate::exec::signal::request_termination;

/// How long output is still read after the process itself has exited.
pub const EXIT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Receiving half of a run's output channel.
pub type OutputReceiver = mpsc::UnboundedReceiver<OutputMessage>;

/// A read end of the child's output.
type OutputReader = Box<dyn AsyncRead + Unpin + Send>;

/// Launch `request` and return its handle plus the channel its output
/// arrives on.
///
/// Never blocks: all reading and waiting happens in a background Tokio task.
/// stdout and stderr share one pipe, so lines arrive in the order the
/// process wrote them. A spawn failure is not an `Err` here; it arrives on
/// the channel as the run's single `Completed(LaunchOrIoError)`. `Err` is
/// only returned when called outside a Tokio runtime.
pub fn start(run_id: RunId, request: &RunRequest) -> Result<(ProcessHandle, OutputReceiver)> {
    let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
        SupervisorError::Other(anyhow!("process runner needs a Tokio runtime: {e}"))
    })?;

    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutputMessage>();

    info!(
        run_id,
        program = %request.program(),
        args = request.args().len(),
        "starting download process"
    );

    let mut cmd = Command::new(request.program());
    cmd.args(request.args())
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let (child, outputs) = match spawn_with_merged_output(cmd) {
        Ok(spawned) => spawned,
        Err(e) => {
            let message = format!("spawning '{}': {e}", request.program());
            error!(run_id, error = %e, "failed to spawn process");
            let _ = out_tx.send(OutputMessage::Completed(CompletionStatus::LaunchOrIoError(
                message,
            )));
            return Ok((ProcessHandle::detached(run_id), out_rx));
        }
    };

    let pid = child.id();
    debug!(run_id, ?pid, "process spawned");

    let (terminate_tx, terminate_rx) = oneshot::channel::<()>();
    runtime.spawn(supervise(run_id, child, outputs, terminate_rx, out_tx));

    Ok((ProcessHandle::new(run_id, pid, terminate_tx), out_rx))
}

/// Spawn `cmd` with stdout and stderr writing into one pipe, so the reader
/// sees both streams in the order the process wrote them.
#[cfg(unix)]
fn spawn_with_merged_output(mut cmd: Command) -> io::Result<(Child, Vec<OutputReader>)> {
    use std::os::fd::OwnedFd;
    use tokio::net::unix::pipe;

    let (reader, writer) = io::pipe()?;
    let stderr_writer = writer.try_clone()?;
    cmd.stdout(writer).stderr(stderr_writer);

    let child = cmd.spawn()?;
    // The command still holds our copies of the write end; EOF only arrives
    // once they are closed.
    drop(cmd);

    let reader = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
    let readers: Vec<OutputReader> = vec![Box::new(reader)];
    Ok((child, readers))
}

/// Without Unix pipes the two streams are read separately and merged as
/// lines arrive; order across the two streams is then not guaranteed.
#[cfg(not(unix))]
fn spawn_with_merged_output(mut cmd: Command) -> io::Result<(Child, Vec<OutputReader>)> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd.spawn()?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr was not captured"))?;
    let readers: Vec<OutputReader> = vec![Box::new(stdout), Box::new(stderr)];
    Ok((child, readers))
}

/// Background unit for one run: forward output, reap the process, and send
/// exactly one `Completed` as the last message.
async fn supervise(
    run_id: RunId,
    mut child: Child,
    outputs: Vec<OutputReader>,
    terminate_rx: oneshot::Receiver<()>,
    out_tx: mpsc::UnboundedSender<OutputMessage>,
) {
    let status = match supervise_inner(run_id, &mut child, outputs, terminate_rx, &out_tx).await {
        Ok(status) => status,
        Err(err) => {
            error!(run_id, error = %format!("{err:#}"), "download process I/O error");
            CompletionStatus::LaunchOrIoError(format!("{err:#}"))
        }
    };

    info!(run_id, status = ?status, "download process finished");

    if out_tx.send(OutputMessage::Completed(status)).is_err() {
        debug!(run_id, "controller dropped the output channel before completion");
    }
    // `child` drops here; if it was not reaped (I/O error path) kill_on_drop stops it.
}

/// Tracks the one-shot termination request for a run.
struct TerminateWatch {
    rx: oneshot::Receiver<()>,
    /// No further request will be read (received, handle dropped, or the
    /// process already exited).
    done: bool,
    requested: bool,
}

impl TerminateWatch {
    /// Handle the resolved receiver. Returns the exit status if the process
    /// turns out to have exited already, in which case nothing is signalled
    /// and the run keeps its own outcome.
    fn on_resolved(
        &mut self,
        res: std::result::Result<(), oneshot::error::RecvError>,
        run_id: RunId,
        child: &mut Child,
    ) -> io::Result<Option<ExitStatus>> {
        self.done = true;
        if res.is_err() {
            debug!(run_id, "process handle dropped without a stop request");
            return Ok(None);
        }

        if let Some(status) = child.try_wait()? {
            debug!(run_id, "stop requested after the process exited; ignoring");
            return Ok(Some(status));
        }

        self.requested = true;
        info!(run_id, pid = ?child.id(), "stop requested; sending termination signal");
        if let Err(e) = request_termination(child) {
            warn!(run_id, error = %e, "failed to deliver termination signal");
        }
        Ok(None)
    }

    /// The process has exited: later stop requests are refused at the handle.
    fn close(&mut self) {
        self.done = true;
        self.rx.close();
    }
}

async fn supervise_inner(
    run_id: RunId,
    child: &mut Child,
    outputs: Vec<OutputReader>,
    terminate_rx: oneshot::Receiver<()>,
    out_tx: &mpsc::UnboundedSender<OutputMessage>,
) -> anyhow::Result<CompletionStatus> {
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<io::Result<String>>();
    let _pumps = PumpGuard(
        outputs
            .into_iter()
            .map(|reader| tokio::spawn(pump_lines(reader, line_tx.clone())))
            .collect(),
    );
    drop(line_tx);

    let mut watch = TerminateWatch {
        rx: terminate_rx,
        done: false,
        requested: false,
    };
    let mut lines = 0usize;
    let mut exit: Option<ExitStatus> = None;
    let mut drain_deadline: Option<Instant> = None;

    // Forward output until the stream closes. The child is reaped as soon as
    // it exits; after that its output only gets a grace period, since a
    // descendant may keep the pipe open.
    loop {
        let mut exited_now = None;
        tokio::select! {
            item = line_rx.recv() => match item {
                Some(Ok(line)) => {
                    lines += 1;
                    let _ = out_tx.send(OutputMessage::Line(line));
                }
                Some(Err(e)) => {
                    return Err(anyhow::Error::new(e).context("reading process output"));
                }
                None => break,
            },
            status = child.wait(), if exit.is_none() => {
                exited_now = Some(status.context("waiting for process exit status")?);
            }
            res = &mut watch.rx, if !watch.done => {
                exited_now = watch
                    .on_resolved(res, run_id, child)
                    .context("checking process status")?;
            }
            _ = sleep_until(drain_deadline.unwrap_or_else(Instant::now)), if drain_deadline.is_some() => {
                warn!(run_id, "output still open after process exit; a child process may hold it");
                break;
            }
        }

        if let Some(status) = exited_now {
            exit = Some(status);
            drain_deadline = Some(Instant::now() + EXIT_DRAIN_GRACE);
            watch.close();
            debug!(run_id, "process exited; draining remaining output");
        }
    }

    debug!(run_id, lines, "output forwarded");

    let status = match exit {
        Some(status) => status,
        None => loop {
            tokio::select! {
                status = child.wait() => {
                    break status.context("waiting for process exit status")?;
                }
                res = &mut watch.rx, if !watch.done => {
                    if let Some(status) = watch
                        .on_resolved(res, run_id, child)
                        .context("checking process status")?
                    {
                        break status;
                    }
                }
            }
        },
    };

    Ok(classify_exit(status, watch.requested))
}

/// Aborts the output pumps if the run ends early.
struct PumpGuard(Vec<JoinHandle<()>>);

impl Drop for PumpGuard {
    fn drop(&mut self) {
        for pump in &self.0 {
            pump.abort();
        }
    }
}

/// Map an exit status to a completion status.
///
/// A run that was asked to stop and did not exit cleanly is `Terminated`,
/// whatever code or signal it reported.
pub fn classify_exit(status: ExitStatus, terminate_requested: bool) -> CompletionStatus {
    if status.success() {
        CompletionStatus::Success
    } else if terminate_requested {
        CompletionStatus::Terminated
    } else {
        CompletionStatus::NonZeroExit(status.code().unwrap_or(-1))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::process::ExitStatusExt;

    use super::*;

    #[test]
    fn exit_codes_are_classified() {
        assert_eq!(classify_exit(ExitStatus::from_raw(0), false), CompletionStatus::Success);
        assert_eq!(classify_exit(ExitStatus::from_raw(0), true), CompletionStatus::Success);
        assert_eq!(
            classify_exit(ExitStatus::from_raw(1 << 8), false),
            CompletionStatus::NonZeroExit(1)
        );
        assert_eq!(
            classify_exit(ExitStatus::from_raw(1 << 8), true),
            CompletionStatus::Terminated
        );
    }

    #[test]
    fn signal_death_without_stop_request_is_non_zero() {
        // Raw wait status 15 = killed by SIGTERM, no exit code.
        assert_eq!(
            classify_exit(ExitStatus::from_raw(15), false),
            CompletionStatus::NonZeroExit(-1)
        );
        assert_eq!(
            classify_exit(ExitStatus::from_raw(15), true),
            CompletionStatus::Terminated
        );
    }

    #[test]
    fn start_outside_runtime_is_an_error() {
        let req = RunRequest::new(["true"]).unwrap();
        assert!(matches!(start(1, &req), Err(SupervisorError::Other(_))));
    }
}
