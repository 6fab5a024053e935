// src/command/builder.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::options::DownloadOptions;
use crate::command::resolve::ExecutableResolver;
use crate::errors::{Result, SupervisorError};
use crate::exec::RunRequest;
use crate::fs::{absolutize, FileSystem};
use crate::types::FormatChoice;

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Build the downloader command-line for `opts`.
///
/// Validates the URL, resolves the downloader executable and makes sure the
/// output directory exists (creating it if needed). Any failure is returned
/// here, before a process is started.
pub fn build_request(
    opts: &DownloadOptions,
    resolver: &dyn ExecutableResolver,
    fs: &dyn FileSystem,
) -> Result<RunRequest> {
    let url = opts.url.trim();
    if url.is_empty() {
        return Err(SupervisorError::Validation(
            "a non-empty URL is required".to_string(),
        ));
    }

    let downloader = opts.downloader.trim();
    if downloader.is_empty() {
        return Err(SupervisorError::Validation(
            "downloader executable name must not be empty".to_string(),
        ));
    }
    let exe = resolver
        .resolve(downloader)
        .ok_or_else(|| SupervisorError::ExecutableNotFound(downloader.to_string()))?;

    let output_dir = prepare_output_dir(&opts.output_dir, fs)?;

    let mut parts: Vec<String> = vec![
        exe.to_string_lossy().into_owned(),
        url.to_string(),
        "-P".to_string(),
        output_dir.to_string_lossy().into_owned(),
    ];
    parts.extend(format_args_for(opts).into_iter().map(str::to_string));
    if opts.format == FormatChoice::Audio {
        parts.push(opts.audio_quality.to_string());
    }
    if !opts.playlist {
        parts.push("--no-playlist".to_string());
    }
    if opts.subtitles {
        parts.extend(["--write-subs", "--sub-langs", "all"].map(str::to_string));
    }

    let request = RunRequest::new(parts)?;
    debug!(command = %request, "built download command");
    Ok(request)
}

/// Format selection flags. For audio the bitrate value follows.
fn format_args_for(opts: &DownloadOptions) -> Vec<&'static str> {
    match opts.format {
        FormatChoice::Video => vec!["-f", "bv*+ba/b", "--merge-output-format", "mp4"],
        FormatChoice::Audio => vec!["-x", "--audio-format", "mp3", "--audio-quality"],
        FormatChoice::Best => vec!["-f", "best"],
    }
}

/// Resolve the output directory to an absolute path and make sure it exists.
fn prepare_output_dir(dir: &Path, fs: &dyn FileSystem) -> Result<PathBuf> {
    let dir = if dir.as_os_str().to_string_lossy().trim().is_empty() {
        PathBuf::from(DEFAULT_OUTPUT_DIR)
    } else {
        dir.to_path_buf()
    };
    let dir = absolutize(fs, &dir)?;

    if fs.exists(&dir) && !fs.is_dir(&dir) {
        return Err(SupervisorError::Validation(format!(
            "output path {} exists and is not a directory",
            dir.display()
        )));
    }

    fs.create_dir_all(&dir).map_err(|e| {
        SupervisorError::Validation(format!(
            "cannot create output directory {}: {e:#}",
            dir.display()
        ))
    })?;

    Ok(dir)
}
