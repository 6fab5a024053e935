// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the downloader with `tokio::process::Command` and reports
//! back to the controller through an output channel of
//! [`OutputMessage`](crate::engine::OutputMessage)s.
//!
//! - [`request`] holds the validated command-line of a run.
//! - [`runner`] spawns the process and owns the background read/reap task.
//! - [`lines`] turns raw stdout/stderr bytes into lines.
//! - [`handle`] is the controller's side of a live process (stop requests).
//! - [`signal`] delivers the platform's termination request.
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `TokioProcessBackend`, which tests can replace with a fake.

pub mod backend;
pub mod handle;
pub mod lines;
pub mod request;
pub mod runner;
pub mod signal;

pub use backend::{ProcessBackend, TokioProcessBackend};
pub use handle::ProcessHandle;
pub use request::RunRequest;
pub use runner::OutputReceiver;
