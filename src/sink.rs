// src/sink.rs

//! Output sinks: where log lines and run-state changes are displayed.
//!
//! The controller's only obligation is to hand over lines and the terminal
//! summary in order; rendering is up to the sink.

use std::io::{self, Write};

use crate::engine::RunState;

/// Destination for a run's visible output.
pub trait OutputSink: Send {
    /// One line of informational or process output.
    fn line(&mut self, text: &str);

    /// The run state changed.
    fn state_changed(&mut self, state: RunState);

    /// The one-line summary of how a run ended.
    fn summary(&mut self, text: &str);
}

/// Writes output to stdout. Logging goes to stderr, so stdout carries only
/// what the downloader printed plus our own status lines.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn write_line(&self, text: &str) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        // A closed stdout (e.g. piped into `head`) must not take the run down.
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

impl OutputSink for ConsoleSink {
    fn line(&mut self, text: &str) {
        self.write_line(text);
    }

    fn state_changed(&mut self, _state: RunState) {}

    fn summary(&mut self, text: &str) {
        self.write_line("");
        self.write_line(text);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn line(&mut self, _text: &str) {}
    fn state_changed(&mut self, _state: RunState) {}
    fn summary(&mut self, _text: &str) {}
}
