use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Which kind of media the downloader should produce.
///
/// - `Video`: best video + best audio, merged into an mp4 container.
/// - `Audio`: audio only, extracted to mp3 at the configured bitrate.
/// - `Best`: whatever single format the site reports as best.
///
/// Config files go through [`FromStr`], so they accept the same spellings
/// as the command line: any case, plus `mp4` and `mp3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(try_from = "String")]
pub enum FormatChoice {
    #[default]
    #[value(alias = "mp4")]
    Video,
    #[value(alias = "mp3")]
    Audio,
    Best,
}

impl FromStr for FormatChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" | "mp4" => Ok(FormatChoice::Video),
            "audio" | "mp3" => Ok(FormatChoice::Audio),
            "best" => Ok(FormatChoice::Best),
            other => Err(format!(
                "invalid format: {other} (expected \"video\", \"audio\" or \"best\")"
            )),
        }
    }
}

impl TryFrom<String> for FormatChoice {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Audio bitrate in kbps used when extracting audio.
///
/// Only the bitrates offered to users are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u16")]
pub struct AudioQuality(u16);

impl AudioQuality {
    pub const SUPPORTED_KBPS: [u16; 6] = [96, 128, 160, 192, 256, 320];

    pub fn kbps(self) -> u16 {
        self.0
    }
}

impl Default for AudioQuality {
    fn default() -> Self {
        AudioQuality(192)
    }
}

impl TryFrom<u16> for AudioQuality {
    type Error = String;

    fn try_from(kbps: u16) -> Result<Self, Self::Error> {
        if Self::SUPPORTED_KBPS.contains(&kbps) {
            Ok(AudioQuality(kbps))
        } else {
            Err(format!(
                "unsupported audio quality: {kbps} kbps (expected one of {:?})",
                Self::SUPPORTED_KBPS
            ))
        }
    }
}

impl FromStr for AudioQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix("kbps")
            .or_else(|| trimmed.strip_suffix('k'))
            .unwrap_or(trimmed)
            .trim();
        let kbps: u16 = digits
            .parse()
            .map_err(|_| format!("invalid audio quality: {trimmed}"))?;
        AudioQuality::try_from(kbps)
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_choice_accepts_aliases() {
        assert_eq!("Video".parse::<FormatChoice>(), Ok(FormatChoice::Video));
        assert_eq!(" mp3 ".parse::<FormatChoice>(), Ok(FormatChoice::Audio));
        assert_eq!("best".parse::<FormatChoice>(), Ok(FormatChoice::Best));
        assert!("flac".parse::<FormatChoice>().is_err());
    }

    #[test]
    fn format_choice_deserializes_case_insensitively() {
        #[derive(Deserialize)]
        struct Doc {
            format: FormatChoice,
        }

        let doc: Doc = toml::from_str("format = \"AUDIO\"").unwrap();
        assert_eq!(doc.format, FormatChoice::Audio);
        let doc: Doc = toml::from_str("format = \"mp4\"").unwrap();
        assert_eq!(doc.format, FormatChoice::Video);
        assert!(toml::from_str::<Doc>("format = \"flac\"").is_err());
    }

    #[test]
    fn audio_quality_only_allows_offered_bitrates() {
        assert_eq!("320".parse::<AudioQuality>().map(AudioQuality::kbps), Ok(320));
        assert_eq!("128k".parse::<AudioQuality>().map(AudioQuality::kbps), Ok(128));
        assert!("100".parse::<AudioQuality>().is_err());
        assert!("loud".parse::<AudioQuality>().is_err());
        assert_eq!(AudioQuality::default().kbps(), 192);
    }
}
