// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SupervisorError};

/// Longest accepted drain interval; beyond this output visibly lags.
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SupervisorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.download, raw.runtime))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runtime(cfg)?;
    validate_download(cfg)?;
    Ok(())
}

fn validate_runtime(cfg: &RawConfigFile) -> Result<()> {
    let ms = cfg.runtime.poll_interval_ms;
    if ms == 0 || ms > MAX_POLL_INTERVAL_MS {
        return Err(SupervisorError::ConfigError(format!(
            "[runtime].poll_interval_ms must be between 1 and {MAX_POLL_INTERVAL_MS} (got {ms})"
        )));
    }
    Ok(())
}

fn validate_download(cfg: &RawConfigFile) -> Result<()> {
    // format / audio_quality are strongly typed and checked during
    // deserialization.
    if let Some(downloader) = &cfg.download.downloader {
        if downloader.trim().is_empty() {
            return Err(SupervisorError::ConfigError(
                "[download].downloader must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
