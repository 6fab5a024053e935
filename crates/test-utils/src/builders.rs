#![allow(dead_code)]

use std::path::PathBuf;

use ytdlp_supervisor::command::DownloadOptions;
use ytdlp_supervisor::exec::RunRequest;
use ytdlp_supervisor::types::{AudioQuality, FormatChoice};

/// A request that runs `script` through `sh -c`.
pub fn sh(script: &str) -> RunRequest {
    RunRequest::new(["sh", "-c", script]).expect("sh request is non-empty")
}

/// Builder for `DownloadOptions` to simplify test setup.
pub struct DownloadOptionsBuilder {
    opts: DownloadOptions,
}

impl DownloadOptionsBuilder {
    pub fn new(url: &str) -> Self {
        Self {
            opts: DownloadOptions::new(url),
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.opts.output_dir = dir.into();
        self
    }

    pub fn format(mut self, format: FormatChoice) -> Self {
        self.opts.format = format;
        self
    }

    pub fn audio_quality(mut self, kbps: u16) -> Self {
        self.opts.audio_quality =
            AudioQuality::try_from(kbps).expect("builder given unsupported bitrate");
        self
    }

    pub fn playlist(mut self, val: bool) -> Self {
        self.opts.playlist = val;
        self
    }

    pub fn subtitles(mut self, val: bool) -> Self {
        self.opts.subtitles = val;
        self
    }

    pub fn downloader(mut self, name: &str) -> Self {
        self.opts.downloader = name.to_string();
        self
    }

    pub fn build(self) -> DownloadOptions {
        self.opts
    }
}
