// Controller state machine against the in-memory backend: admission control,
// stop semantics and drain ordering, with no real processes involved.

mod common;

use common::init_tracing;
use ytdlp_supervisor::engine::controller::STOP_NOTICE;
use ytdlp_supervisor::engine::{CompletionStatus, Controller, RunState};
use ytdlp_supervisor::errors::SupervisorError;
use ytdlp_supervisor::exec::RunRequest;
use ytdlp_supervisor_test_utils::fake_backend::FakeBackend;
use ytdlp_supervisor_test_utils::recording_sink::{RecordingSink, SinkEvent};

fn request() -> RunRequest {
    RunRequest::new(["yt-dlp", "https://example.com/watch?v=1"]).unwrap()
}

#[test]
fn full_run_moves_idle_running_idle() {
    init_tracing();

    let backend = FakeBackend::new();
    let sink = RecordingSink::new();
    let mut controller = Controller::new(backend.clone(), sink.clone());
    assert_eq!(controller.state(), RunState::Idle);

    let run_id = controller.start(request()).unwrap();
    assert_eq!(controller.state(), RunState::Running);
    assert_eq!(controller.current_run(), Some(run_id));

    {
        let runs = backend.runs();
        let runs = runs.lock().unwrap();
        runs[0].line("[download]   5.0% of 10MiB");
        runs[0].line("[download] 100% of 10MiB");
        runs[0].complete(CompletionStatus::Success);
    }

    let outcome = controller.drain();
    assert_eq!(outcome.lines, 2);
    assert_eq!(outcome.completed, Some(CompletionStatus::Success));
    assert_eq!(controller.state(), RunState::Idle);
    assert_eq!(controller.last_status(), Some(&CompletionStatus::Success));

    assert_eq!(
        sink.events(),
        vec![
            SinkEvent::Line("$ yt-dlp 'https://example.com/watch?v=1'".to_string()),
            SinkEvent::State(RunState::Running),
            SinkEvent::Line("[download]   5.0% of 10MiB".to_string()),
            SinkEvent::Line("[download] 100% of 10MiB".to_string()),
            SinkEvent::Summary("Download completed.".to_string()),
            SinkEvent::State(RunState::Idle),
        ]
    );
    assert_eq!(controller.log().last().map(String::as_str), Some("Download completed."));
}

#[test]
fn start_while_running_is_rejected_without_spawning() {
    init_tracing();

    let backend = FakeBackend::new();
    let mut controller = Controller::new(backend.clone(), RecordingSink::new());

    controller.start(request()).unwrap();
    let err = controller.start(request()).unwrap_err();
    assert!(matches!(err, SupervisorError::AlreadyRunning));
    assert_eq!(backend.started(), 1);
    assert_eq!(controller.state(), RunState::Running);

    // The first run is undisturbed and finishes normally.
    {
        let runs = backend.runs();
        let mut runs = runs.lock().unwrap();
        assert!(!runs[0].terminate_requested());
        runs[0].line("still going");
        runs[0].complete(CompletionStatus::Success);
    }
    let outcome = controller.drain();
    assert_eq!(outcome.lines, 1);
    assert_eq!(outcome.completed, Some(CompletionStatus::Success));
}

#[test]
fn stop_while_idle_is_a_no_op() {
    init_tracing();

    let sink = RecordingSink::new();
    let mut controller = Controller::new(FakeBackend::new(), sink.clone());

    assert!(!controller.stop());
    assert_eq!(controller.state(), RunState::Idle);
    assert!(controller.log().is_empty());
    assert!(sink.events().is_empty());
}

#[test]
fn stop_forwards_once_and_keeps_running_until_completed() {
    init_tracing();

    let backend = FakeBackend::new();
    let mut controller = Controller::new(backend.clone(), RecordingSink::new());
    controller.start(request()).unwrap();

    assert!(controller.stop());
    assert!(!controller.stop(), "second stop is not forwarded");
    assert_eq!(controller.state(), RunState::Running);

    let notices = controller.log().iter().filter(|l| *l == STOP_NOTICE).count();
    assert_eq!(notices, 1);

    {
        let runs = backend.runs();
        let mut runs = runs.lock().unwrap();
        assert!(runs[0].terminate_requested());
        runs[0].complete(CompletionStatus::Terminated);
    }

    let outcome = controller.drain();
    assert_eq!(outcome.completed, Some(CompletionStatus::Terminated));
    assert_eq!(controller.state(), RunState::Idle);
    assert_eq!(
        controller.log().last().map(String::as_str),
        Some("Download stopped by user.")
    );
}

#[test]
fn drain_without_messages_changes_nothing() {
    init_tracing();

    let mut controller = Controller::new(FakeBackend::new(), RecordingSink::new());
    assert_eq!(controller.drain().lines, 0);

    controller.start(request()).unwrap();
    let outcome = controller.drain();
    assert_eq!(outcome.lines, 0);
    assert!(outcome.completed.is_none());
    assert_eq!(controller.state(), RunState::Running);
}

#[test]
fn lines_queued_across_drains_keep_their_order() {
    init_tracing();

    let backend = FakeBackend::new();
    let sink = RecordingSink::new();
    let mut controller = Controller::new(backend.clone(), sink.clone());
    controller.start(request()).unwrap();

    let runs = backend.runs();
    runs.lock().unwrap()[0].line("one");
    assert_eq!(controller.drain().lines, 1);

    runs.lock().unwrap()[0].line("two");
    runs.lock().unwrap()[0].line("three");
    assert_eq!(controller.drain().lines, 2);

    runs.lock().unwrap()[0].complete(CompletionStatus::NonZeroExit(1));
    let outcome = controller.drain();
    assert_eq!(outcome.completed, Some(CompletionStatus::NonZeroExit(1)));

    let lines = sink.lines();
    assert_eq!(&lines[1..], &["one", "two", "three"]);
    assert_eq!(sink.summaries(), vec!["Process exited with code 1.".to_string()]);
}

#[test]
fn a_new_run_can_start_after_completion() {
    init_tracing();

    let backend = FakeBackend::new();
    let mut controller = Controller::new(backend.clone(), RecordingSink::new());

    let first = controller.start(request()).unwrap();
    backend.runs().lock().unwrap()[0].complete(CompletionStatus::LaunchOrIoError(
        "No such file or directory".to_string(),
    ));
    controller.drain();
    assert_eq!(controller.state(), RunState::Idle);

    let second = controller.start(request()).unwrap();
    assert_ne!(first, second);
    assert_eq!(backend.started(), 2);

    let summaries: Vec<_> = controller
        .log()
        .iter()
        .filter(|l| l.starts_with("Failed to run downloader:"))
        .collect();
    assert_eq!(summaries.len(), 1);
}
