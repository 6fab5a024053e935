// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::{AudioQuality, FormatChoice};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [download]
/// output_dir = "~/Videos/yt"
/// format = "audio"
/// audio_quality = 256
/// playlist = false
/// subtitles = true
/// downloader = "yt-dlp"
///
/// [runtime]
/// poll_interval_ms = 120
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub download: DownloadSection,

    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// `[download]` section: defaults for the download options.
///
/// `None` means "use the built-in default".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadSection {
    #[serde(default)]
    pub output_dir: Option<String>,

    /// `"video"`, `"audio"` or `"best"`.
    #[serde(default)]
    pub format: Option<FormatChoice>,

    /// Bitrate in kbps; one of 96, 128, 160, 192, 256, 320.
    #[serde(default)]
    pub audio_quality: Option<AudioQuality>,

    #[serde(default)]
    pub playlist: Option<bool>,

    #[serde(default)]
    pub subtitles: Option<bool>,

    /// Downloader executable name or path.
    #[serde(default)]
    pub downloader: Option<String>,
}

/// `[runtime]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    /// How often the output channel is drained, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    120
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl RuntimeSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Validated configuration.
///
/// Construct through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`) or [`ConfigFile::default`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    download: DownloadSection,
    runtime: RuntimeSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(download: DownloadSection, runtime: RuntimeSection) -> Self {
        Self { download, runtime }
    }

    pub fn download(&self) -> &DownloadSection {
        &self.download
    }

    pub fn runtime(&self) -> &RuntimeSection {
        &self.runtime
    }
}
