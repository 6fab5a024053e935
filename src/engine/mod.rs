// src/engine/mod.rs

//! Run supervision engine.
//!
//! - [`controller`] owns the single active run: admission control, the
//!   non-blocking drain of the output channel and the accumulated log.
//! - [`runtime`] is the async shell that drives the controller on a fixed
//!   polling cadence and turns Ctrl-C into a stop request.
//!
//! The message types shared between the process layer (producer) and the
//! controller (consumer) live here.

use std::fmt;

/// Monotonic identifier of a run within one controller.
pub type RunId = u64;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The process exited with status 0.
    Success,
    /// The process exited on its own with a non-zero status.
    NonZeroExit(i32),
    /// Spawning, reading output or waiting for the process failed.
    LaunchOrIoError(String),
    /// The process went away after an explicit stop request.
    Terminated,
}

impl CompletionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionStatus::Success)
    }

    /// One human-readable line describing the outcome.
    pub fn summary(&self) -> String {
        match self {
            CompletionStatus::Success => "Download completed.".to_string(),
            CompletionStatus::NonZeroExit(code) => {
                format!("Process exited with code {code}.")
            }
            CompletionStatus::LaunchOrIoError(msg) => {
                format!("Failed to run downloader: {msg}")
            }
            CompletionStatus::Terminated => "Download stopped by user.".to_string(),
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// A message on a run's output channel.
///
/// For one run, every `Line` precedes the single `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMessage {
    Line(String),
    Completed(CompletionStatus),
}

/// Caller-visible state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

pub mod controller;
pub mod runtime;

pub use controller::{Controller, DrainOutcome};
pub use runtime::{ControlEvent, Runtime, RuntimeOptions, DEFAULT_POLL_INTERVAL};
