// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Flags override values from the config file, which override built-in
//! defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::command::DownloadOptions;
use crate::config::ConfigFile;
use crate::config::validate::MAX_POLL_INTERVAL_MS;
use crate::errors::{Result, SupervisorError};
use crate::types::{AudioQuality, FormatChoice};

/// Command-line arguments for `ytdlp-supervisor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ytdlp-supervisor",
    version,
    about = "Run a yt-dlp download, stream its output, stop it with Ctrl-C.",
    long_about = None
)]
pub struct CliArgs {
    /// URL of the video, track or playlist to download.
    pub url: String,

    /// Directory to save files in (created if missing).
    ///
    /// Default: `downloads` in the current working directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// What to download.
    #[arg(short, long, value_enum, ignore_case = true, value_name = "FORMAT")]
    pub format: Option<FormatChoice>,

    /// Audio bitrate in kbps for `--format audio` (96, 128, 160, 192, 256, 320).
    #[arg(long, value_name = "KBPS")]
    pub audio_quality: Option<AudioQuality>,

    /// Download the whole playlist when the URL belongs to one.
    #[arg(long, overrides_with = "no_playlist")]
    pub playlist: bool,

    /// Download only the single item even if the URL belongs to a playlist.
    #[arg(long, overrides_with = "playlist")]
    pub no_playlist: bool,

    /// Also download all available subtitles.
    #[arg(long, overrides_with = "no_subtitles")]
    pub subtitles: bool,

    /// Do not download subtitles.
    #[arg(long, overrides_with = "subtitles")]
    pub no_subtitles: bool,

    /// Downloader executable name or path.
    #[arg(long, value_name = "NAME")]
    pub downloader: Option<String>,

    /// Path to a TOML config file with defaults.
    ///
    /// If omitted, `$YTDLP_SUPERVISOR_CONFIG` or `ytdlp-supervisor.toml` is
    /// used when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How often downloader output is collected, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `YTDLP_SUPERVISOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the download command, but don't run it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Merge flags with config-file defaults.
    pub fn download_options(&self, cfg: &ConfigFile) -> DownloadOptions {
        let file = cfg.download();
        let mut opts = DownloadOptions::new(self.url.clone());

        if let Some(dir) = self
            .output_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| file.output_dir.clone())
        {
            opts.output_dir = PathBuf::from(shellexpand::tilde(&dir).into_owned());
        }
        if let Some(format) = self.format.or(file.format) {
            opts.format = format;
        }
        if let Some(quality) = self.audio_quality.or(file.audio_quality) {
            opts.audio_quality = quality;
        }
        if let Some(playlist) = flag_pair(self.playlist, self.no_playlist).or(file.playlist) {
            opts.playlist = playlist;
        }
        if let Some(subtitles) = flag_pair(self.subtitles, self.no_subtitles).or(file.subtitles) {
            opts.subtitles = subtitles;
        }
        if let Some(downloader) = self.downloader.clone().or_else(|| file.downloader.clone()) {
            opts.downloader = downloader;
        }

        opts
    }

    /// Effective drain interval.
    pub fn poll_interval(&self, cfg: &ConfigFile) -> Result<Duration> {
        match self.poll_interval_ms {
            Some(ms) if ms == 0 || ms > MAX_POLL_INTERVAL_MS => {
                Err(SupervisorError::ConfigError(format!(
                    "--poll-interval-ms must be between 1 and {MAX_POLL_INTERVAL_MS} (got {ms})"
                )))
            }
            Some(ms) => Ok(Duration::from_millis(ms)),
            None => Ok(cfg.runtime().poll_interval()),
        }
    }
}

/// `--x` / `--no-x`: the last one given wins; neither means "unset".
fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DownloadSection, RawConfigFile};

    fn config_with(download: DownloadSection) -> ConfigFile {
        ConfigFile::try_from(RawConfigFile {
            download,
            ..RawConfigFile::default()
        })
        .unwrap()
    }

    #[test]
    fn flags_override_config() {
        let cfg = config_with(DownloadSection {
            format: Some(FormatChoice::Audio),
            playlist: Some(true),
            downloader: Some("yt-dlp-nightly".into()),
            ..DownloadSection::default()
        });
        let args = CliArgs::parse_from([
            "ytdlp-supervisor",
            "https://example.com/v",
            "--format",
            "best",
            "--no-playlist",
        ]);

        let opts = args.download_options(&cfg);
        assert_eq!(opts.format, FormatChoice::Best);
        assert!(!opts.playlist);
        assert_eq!(opts.downloader, "yt-dlp-nightly");
    }

    #[test]
    fn config_fills_unset_flags() {
        let cfg = config_with(DownloadSection {
            subtitles: Some(true),
            audio_quality: Some(AudioQuality::try_from(128).unwrap()),
            ..DownloadSection::default()
        });
        let args = CliArgs::parse_from(["ytdlp-supervisor", "https://example.com/v"]);

        let opts = args.download_options(&cfg);
        assert!(opts.subtitles);
        assert_eq!(opts.audio_quality.kbps(), 128);
        assert_eq!(opts.format, FormatChoice::Video);
    }

    #[test]
    fn format_flag_ignores_case_and_accepts_aliases() {
        let args = CliArgs::parse_from(["ytdlp-supervisor", "u", "--format", "Video"]);
        assert_eq!(args.format, Some(FormatChoice::Video));

        let args = CliArgs::parse_from(["ytdlp-supervisor", "u", "-f", "MP3"]);
        assert_eq!(args.format, Some(FormatChoice::Audio));

        assert!(CliArgs::try_parse_from(["ytdlp-supervisor", "u", "-f", "flac"]).is_err());
    }

    #[test]
    fn audio_quality_flag_is_validated() {
        let res = CliArgs::try_parse_from([
            "ytdlp-supervisor",
            "https://example.com/v",
            "--audio-quality",
            "999",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn poll_interval_bounds() {
        let cfg = ConfigFile::default();
        let args = CliArgs::parse_from(["ytdlp-supervisor", "u", "--poll-interval-ms", "0"]);
        assert!(args.poll_interval(&cfg).is_err());

        let args = CliArgs::parse_from(["ytdlp-supervisor", "u"]);
        assert_eq!(args.poll_interval(&cfg).unwrap(), Duration::from_millis(120));
    }
}
