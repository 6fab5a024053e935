#![allow(dead_code)]

use std::time::Duration;

use tokio::sync::mpsc;
use ytdlp_supervisor::engine::{CompletionStatus, Controller, OutputMessage};
use ytdlp_supervisor::exec::{OutputReceiver, ProcessBackend};
use ytdlp_supervisor::sink::OutputSink;

pub use ytdlp_supervisor_test_utils::{init_tracing, with_timeout};

/// Receive every message of one run until the channel closes.
///
/// Panics if the run does not finish within 10 seconds.
pub async fn collect_run(mut rx: OutputReceiver) -> Vec<OutputMessage> {
    let collect = async {
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }
        messages
    };
    tokio::time::timeout(Duration::from_secs(10), collect)
        .await
        .expect("run did not finish within 10 seconds")
}

/// Lines of a collected run, in order.
pub fn lines_of(messages: &[OutputMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match m {
            OutputMessage::Line(l) => Some(l.clone()),
            OutputMessage::Completed(_) => None,
        })
        .collect()
}

/// Assert the stream holds exactly one `Completed`, as its last message, and
/// return its status.
pub fn single_completion(messages: &[OutputMessage]) -> CompletionStatus {
    let completions: Vec<_> = messages
        .iter()
        .enumerate()
        .filter_map(|(i, m)| match m {
            OutputMessage::Completed(s) => Some((i, s.clone())),
            OutputMessage::Line(_) => None,
        })
        .collect();

    assert_eq!(completions.len(), 1, "expected exactly one Completed: {messages:?}");
    let (idx, status) = completions.into_iter().next().unwrap();
    assert_eq!(idx, messages.len() - 1, "Completed must be the last message");
    status
}

/// Drain `controller` on a short cadence until its run completes.
pub async fn drain_until_idle<B, S>(controller: &mut Controller<B, S>) -> CompletionStatus
where
    B: ProcessBackend,
    S: OutputSink,
{
    let poll = async {
        loop {
            if let Some(status) = controller.drain().completed {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(10), poll)
        .await
        .expect("controller did not return to idle within 10 seconds")
}

/// A control channel whose sender is kept by the test.
pub fn control_channel<T>() -> (mpsc::UnboundedSender<T>, mpsc::UnboundedReceiver<T>) {
    mpsc::unbounded_channel()
}
