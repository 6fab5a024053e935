// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Environment variable that can point at a config file.
pub const CONFIG_ENV: &str = "YTDLP_SUPERVISOR_CONFIG";

/// File name looked for in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "ytdlp-supervisor.toml";

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the semantic checks.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from disk and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&RealFileSystem, &path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the config the application should use.
///
/// - An explicit path must exist.
/// - Otherwise the default location is used if present.
/// - With neither, built-in defaults apply.
pub fn load_optional(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<ConfigFile> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path();
            if !fs.exists(&p) {
                debug!(path = %p.display(), "no config file; using defaults");
                return Ok(ConfigFile::default());
            }
            p
        }
    };

    debug!(path = %path.display(), "loading config file");
    let raw = load_from_path(fs, &path)?;
    ConfigFile::try_from(raw)
}

/// Default config path: `$YTDLP_SUPERVISOR_CONFIG` if set, otherwise
/// `ytdlp-supervisor.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SupervisorError;
    use crate::fs::mock::MockFileSystem;
    use crate::types::FormatChoice;

    #[test]
    fn parses_both_sections() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/cfg.toml",
            r#"
[download]
format = "audio"
audio_quality = 256
subtitles = true

[runtime]
poll_interval_ms = 50
"#,
        );

        let cfg = load_optional(&fs, Some(Path::new("/cfg.toml"))).unwrap();
        assert_eq!(cfg.download().format, Some(FormatChoice::Audio));
        assert_eq!(cfg.download().audio_quality.map(|q| q.kbps()), Some(256));
        assert_eq!(cfg.download().subtitles, Some(true));
        assert_eq!(cfg.download().playlist, None);
        assert_eq!(cfg.runtime().poll_interval_ms, 50);
    }

    #[test]
    fn unsupported_bitrate_is_a_toml_error() {
        let fs = MockFileSystem::new();
        fs.add_file("/cfg.toml", "[download]\naudio_quality = 100\n");

        let err = load_optional(&fs, Some(Path::new("/cfg.toml"))).unwrap_err();
        assert!(matches!(err, SupervisorError::TomlError(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let fs = MockFileSystem::new();
        fs.add_file("/cfg.toml", "[download]\nresolution = \"4k\"\n");

        assert!(load_optional(&fs, Some(Path::new("/cfg.toml"))).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let fs = MockFileSystem::new();
        assert!(load_optional(&fs, Some(Path::new("/nope.toml"))).is_err());
    }
}
