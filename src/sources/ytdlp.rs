use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};

use anyhow::Result;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use crate::models::{PlaylistInfo, VideoInfo};
use crate::sources::MediaSource;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("`{0}` was not found; install yt-dlp and make sure it is on PATH")]
    NotFound(String),

    #[error("yt-dlp failed ({status}): {message}")]
    Failed { status: ExitStatus, message: String },

    #[error("unexpected yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("yt-dlp finished but {0} was not written")]
    MissingOutput(PathBuf),

    #[error("cannot run yt-dlp: {0}")]
    Io(#[from] std::io::Error),
}

/// `yt-dlp` command-line wrapper. Conversion to MP3 is done by yt-dlp's
/// ffmpeg post-processor.
pub struct YtDlp {
    program: String,
    audio_quality: String,
    ffmpeg_location: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(cfg: &Config) -> Self {
        Self {
            program: cfg.tools.ytdlp.clone(),
            audio_quality: cfg.output.audio_quality.clone(),
            ffmpeg_location: cfg.tools.ffmpeg_location.clone(),
        }
    }

    /// Runs `yt-dlp --version` and returns the reported version.
    pub fn check_available(&self) -> Result<String, ExtractError> {
        let output = self.run(&[OsString::from("--version")])?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run(&self, args: &[OsString]) -> Result<Output, ExtractError> {
        log::debug!("running {} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractError::NotFound(self.program.clone()),
                _ => ExtractError::Io(e),
            })?;

        if !output.status.success() {
            return Err(ExtractError::Failed {
                status: output.status,
                message: error_message(&output.stderr),
            });
        }
        Ok(output)
    }

    fn run_json<T: DeserializeOwned>(&self, args: &[OsString]) -> Result<T, ExtractError> {
        let output = self.run(args)?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    fn download_args(&self, url: &str, dir: &Path, stem: &str) -> Vec<OsString> {
        let template = dir.join(format!("{}.%(ext)s", escape_template(stem)));

        let mut args: Vec<OsString> = [
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(format!("{}K", self.audio_quality.trim_end_matches(['k', 'K'])).into());
        args.extend(["--no-playlist", "--no-warnings", "--quiet"].map(OsString::from));
        if let Some(ref ffmpeg) = self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.into());
        }
        args.push("--output".into());
        args.push(template.into());
        args.push(url.into());
        args
    }
}

impl MediaSource for YtDlp {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn fetch_video(&self, url: &str) -> Result<VideoInfo> {
        let info: VideoInfo = self.run_json(&info_args(url, false))?;
        log::debug!("fetched video {:?}", info.id);
        Ok(info)
    }

    fn fetch_playlist(&self, url: &str) -> Result<PlaylistInfo> {
        Ok(self.run_json(&info_args(url, true))?)
    }

    fn download_audio(&self, url: &str, dir: &Path, stem: &str) -> Result<PathBuf> {
        self.run(&self.download_args(url, dir, stem))?;

        let path = dir.join(format!("{stem}.mp3"));
        if !path.is_file() {
            return Err(ExtractError::MissingOutput(path).into());
        }
        Ok(path)
    }
}

fn info_args(url: &str, flat: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--dump-single-json".into(), "--no-warnings".into()];
    if flat {
        args.push("--flat-playlist".into());
    } else {
        args.push("--no-playlist".into());
    }
    args.push(url.into());
    args
}

/// `%` starts an output template field in yt-dlp.
fn escape_template(stem: &str) -> String {
    stem.replace('%', "%%")
}

/// Prefers yt-dlp's own `ERROR:` line over the rest of stderr.
fn error_message(stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("ERROR:"))
        .map(str::trim)
        .or_else(|| lines.last().copied())
        .unwrap_or("no error output")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_info_args() {
        assert_eq!(
            strings(&info_args("https://youtu.be/x", false)),
            ["--dump-single-json", "--no-warnings", "--no-playlist", "https://youtu.be/x"]
        );
        assert!(strings(&info_args("u", true)).contains(&"--flat-playlist".to_string()));
    }

    #[test]
    fn test_download_args() {
        let mut cfg = Config::default();
        cfg.output.audio_quality = "320k".to_string();
        cfg.tools.ffmpeg_location = Some(PathBuf::from("/opt/ffmpeg"));
        let ytdlp = YtDlp::new(&cfg);

        let args = strings(&ytdlp.download_args("URL", Path::new("out"), "A - 100% B"));
        let quality = args.iter().position(|a| a == "--audio-quality").unwrap();
        assert_eq!(args[quality + 1], "320K");
        let ffmpeg = args.iter().position(|a| a == "--ffmpeg-location").unwrap();
        assert_eq!(args[ffmpeg + 1], "/opt/ffmpeg");
        let output = args.iter().position(|a| a == "--output").unwrap();
        assert_eq!(
            PathBuf::from(&args[output + 1]),
            Path::new("out").join("A - 100%% B.%(ext)s")
        );
        assert_eq!(args.last().map(String::as_str), Some("URL"));
    }

    #[test]
    fn test_error_message() {
        let stderr = b"WARNING: something\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(error_message(stderr), "[youtube] abc: Video unavailable");
        assert_eq!(error_message(b"plain failure\n\n"), "plain failure");
        assert_eq!(error_message(b""), "no error output");
    }

    #[test]
    fn test_missing_program() {
        let mut cfg = Config::default();
        cfg.tools.ytdlp = "yt-dlp-definitely-not-installed".to_string();
        let err = YtDlp::new(&cfg).check_available().unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    #[ignore]
    fn test_fetch_real_video() {
        let ytdlp = YtDlp::new(&Config::default());
        let info = ytdlp
            .fetch_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .expect("fetch_video");
        assert!(info.title.is_some());
        assert!(!info.channel_name().is_empty());
    }
}
