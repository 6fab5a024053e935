// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The controller talks to a `ProcessBackend` instead of calling
//! [`runner::start`](super::runner::start) directly. Tests swap in a fake
//! backend that hands out scripted output channels without spawning anything.

use std::sync::Arc;

use tracing::warn;

use crate::command::{ExecutableResolver, PathResolver};
use crate::engine::RunId;
use crate::errors::{Result, SupervisorError};

use super::handle::ProcessHandle;
use super::request::RunRequest;
use super::runner::{self, OutputReceiver};

/// How the controller launches a run.
pub trait ProcessBackend: Send {
    /// Launch `request` as run `run_id`.
    ///
    /// Must not block. Run-lifecycle failures are reported on the returned
    /// channel; `Err` means nothing was started and no channel exists.
    fn start(&mut self, run_id: RunId, request: &RunRequest)
    -> Result<(ProcessHandle, OutputReceiver)>;
}

/// Production backend: real OS processes driven by Tokio.
///
/// The program is looked up before anything is spawned, so a missing
/// executable is an `ExecutableNotFound` error rather than a failed run.
#[derive(Debug, Clone)]
pub struct TokioProcessBackend {
    resolver: Arc<dyn ExecutableResolver>,
}

impl TokioProcessBackend {
    pub fn new(resolver: Arc<dyn ExecutableResolver>) -> Self {
        Self { resolver }
    }
}

impl Default for TokioProcessBackend {
    fn default() -> Self {
        Self::new(Arc::new(PathResolver))
    }
}

impl ProcessBackend for TokioProcessBackend {
    fn start(
        &mut self,
        run_id: RunId,
        request: &RunRequest,
    ) -> Result<(ProcessHandle, OutputReceiver)> {
        if self.resolver.resolve(request.program()).is_none() {
            warn!(run_id, program = %request.program(), "executable not found; nothing started");
            return Err(SupervisorError::ExecutableNotFound(
                request.program().to_string(),
            ));
        }
        runner::start(run_id, request)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[derive(Debug)]
    struct NothingInstalled;

    impl ExecutableResolver for NothingInstalled {
        fn resolve(&self, _name: &str) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn unresolvable_program_is_rejected_before_spawning() {
        // No runtime here: reaching the runner would fail with `Other`.
        let mut backend = TokioProcessBackend::new(Arc::new(NothingInstalled));
        let req = RunRequest::new(["yt-dlp", "https://example.com/v"]).unwrap();

        match backend.start(1, &req) {
            Err(SupervisorError::ExecutableNotFound(name)) => assert_eq!(name, "yt-dlp"),
            other => panic!("expected ExecutableNotFound, got {:?}", other.map(|_| ())),
        }
    }
}
