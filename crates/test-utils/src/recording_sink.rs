use std::sync::{Arc, Mutex};

use ytdlp_supervisor::engine::RunState;
use ytdlp_supervisor::sink::OutputSink;

/// Everything a sink was told, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Line(String),
    State(RunState),
    Summary(String),
}

/// A sink that records its events for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Line(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Summary(s) => Some(s),
                _ => None,
            })
            .collect()
    }
}

impl OutputSink for RecordingSink {
    fn line(&mut self, text: &str) {
        self.events.lock().unwrap().push(SinkEvent::Line(text.to_string()));
    }

    fn state_changed(&mut self, state: RunState) {
        self.events.lock().unwrap().push(SinkEvent::State(state));
    }

    fn summary(&mut self, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Summary(text.to_string()));
    }
}
