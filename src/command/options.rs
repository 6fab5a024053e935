// src/command/options.rs

use std::path::PathBuf;

use crate::types::{AudioQuality, FormatChoice};

/// Executable looked up on `PATH` unless configured otherwise.
pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

/// Everything the user chooses for one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub url: String,
    /// Where files are written. Relative paths are resolved against the
    /// current directory; empty means the default directory.
    pub output_dir: PathBuf,
    pub format: FormatChoice,
    /// Only used for [`FormatChoice::Audio`].
    pub audio_quality: AudioQuality,
    /// Download the whole playlist when the URL points into one.
    pub playlist: bool,
    /// Also fetch every available subtitle track.
    pub subtitles: bool,
    /// Name or path of the downloader executable.
    pub downloader: String,
}

impl DownloadOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_dir: PathBuf::new(),
            format: FormatChoice::default(),
            audio_quality: AudioQuality::default(),
            playlist: false,
            subtitles: false,
            downloader: DEFAULT_DOWNLOADER.to_string(),
        }
    }
}
