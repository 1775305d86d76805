pub mod artwork;
pub mod ytdlp;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::models::{PlaylistInfo, VideoInfo};

/// Media extraction and conversion backend.
/// `yt-dlp` is the real implementation; tests plug in stubs.
pub trait MediaSource {
    fn name(&self) -> &str;
    /// Full metadata for a single video.
    fn fetch_video(&self, url: &str) -> Result<VideoInfo>;
    /// Flat listing of a URL. Single videos come back with `_type == "video"`.
    fn fetch_playlist(&self, url: &str) -> Result<PlaylistInfo>;
    /// Downloads the best audio stream and converts it to `<dir>/<stem>.mp3`.
    /// Returns the path of the written file.
    fn download_audio(&self, url: &str, dir: &Path, stem: &str) -> Result<PathBuf>;
}

/// Cover art download.
pub trait ArtworkSource {
    fn fetch_artwork(&self, url: &str) -> Result<Vec<u8>>;
}
