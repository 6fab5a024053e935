// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod sink;
pub mod types;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::command::{build_request, DownloadOptions, PathResolver};
use crate::config::load_optional;
use crate::engine::{CompletionStatus, ControlEvent, Controller, Runtime, RuntimeOptions};
use crate::exec::{RunRequest, TokioProcessBackend};
use crate::fs::RealFileSystem;
use crate::sink::ConsoleSink;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading and flag merging
/// - command construction (URL check, executable lookup, output directory)
/// - the controller + polling runtime
/// - Ctrl-C handling (first Ctrl-C stops the download)
pub async fn run(args: CliArgs) -> Result<i32> {
    let fs = RealFileSystem;
    let cfg = load_optional(&fs, args.config.as_deref())?;

    let opts = args.download_options(&cfg);
    let poll_interval = args.poll_interval(&cfg)?;
    let request = build_request(&opts, &PathResolver, &fs)?;

    if args.dry_run {
        print_dry_run(&opts, &request);
        return Ok(0);
    }

    let (control_tx, control_rx) = mpsc::unbounded_channel::<ControlEvent>();

    // Ctrl-C → stop the active download. The run still ends through its
    // completion message, so the summary is always printed.
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            if control_tx.send(ControlEvent::StopRequested).is_err() {
                return;
            }
            info!("Ctrl+C received; stopping download");
        }
    });

    let controller = Controller::new(TokioProcessBackend::default(), ConsoleSink);
    let mut runtime = Runtime::new(controller, control_rx, RuntimeOptions { poll_interval });
    let status = runtime.run(request).await?;

    debug!(status = ?status, "download finished");
    Ok(exit_code(&status))
}

/// Exit code for the binary: 0 only when the download succeeded.
pub fn exit_code(status: &CompletionStatus) -> i32 {
    if status.is_success() { 0 } else { 1 }
}

/// Dry-run output: the resolved options and the exact command.
fn print_dry_run(opts: &DownloadOptions, request: &RunRequest) {
    println!("ytdlp-supervisor dry-run");
    println!("  url: {}", opts.url.trim());
    println!("  format: {:?}", opts.format);
    println!("  audio_quality: {} kbps", opts.audio_quality);
    println!("  playlist: {}", opts.playlist);
    println!("  subtitles: {}", opts.subtitles);
    println!();
    println!("$ {}", request.display_command());

    debug!("dry-run complete (no execution)");
}
