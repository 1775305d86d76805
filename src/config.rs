use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; playlists get a sub-directory named after them.
    pub directory: PathBuf,
    /// Passed to `yt-dlp --audio-quality`, in kbit/s.
    pub audio_quality: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./downloaded-mp3"),
            audio_quality: "192".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ytdlp: String,
    pub ffmpeg_location: Option<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp: "yt-dlp".to_string(),
            ffmpeg_location: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub default_album: String,
    pub default_genre: String,
    /// Maximum number of characters of the video description kept as comment.
    pub comment_limit: usize,
    pub embed_thumbnail: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            default_album: "YouTube Music".to_string(),
            default_genre: "Music".to_string(),
            comment_limit: 250,
            embed_thumbnail: true,
        }
    }
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("yt2mp3")
        .join("config.toml")
}

pub fn load_config() -> Config {
    let path = config_path();
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            log::warn!("ignoring invalid config {}: {:#}", path.display(), e);
            Config::default()
        }),
        Err(e) => {
            log::warn!("cannot read config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).context("failed to parse config TOML")
}

pub fn save_config(config: &Config) -> Result<PathBuf> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.output.directory, PathBuf::from("./downloaded-mp3"));
        assert_eq!(cfg.output.audio_quality, "192");
        assert_eq!(cfg.tools.ytdlp, "yt-dlp");
        assert_eq!(cfg.metadata.default_album, "YouTube Music");
        assert!(cfg.metadata.embed_thumbnail);
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[output]
directory = "/music/inbox"

[metadata]
comment_limit = 80
embed_thumbnail = false
"#,
        )
        .unwrap();
        assert_eq!(cfg.output.directory, PathBuf::from("/music/inbox"));
        assert_eq!(cfg.output.audio_quality, "192");
        assert_eq!(cfg.metadata.comment_limit, 80);
        assert!(!cfg.metadata.embed_thumbnail);
        assert_eq!(cfg.metadata.default_genre, "Music");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut cfg = Config::default();
        cfg.tools.ffmpeg_location = Some(PathBuf::from("/opt/ffmpeg/bin"));
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = parse_config(&text).unwrap();
        assert_eq!(back.tools.ffmpeg_location, cfg.tools.ffmpeg_location);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(parse_config("output = 3").is_err());
    }
}
