use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::core::url::{self, UrlKind};
use crate::core::{renamer, tagger};
use crate::models::{BatchSummary, PlaylistInfo, TrackMetadata, VideoInfo};
use crate::sources::{ArtworkSource, MediaSource};

/// Result of processing one user-supplied URL.
#[derive(Debug)]
pub enum Outcome {
    Track(PathBuf),
    Playlist(BatchSummary),
}

/// Sequential download → convert → tag pipeline.
pub struct Downloader<'a> {
    source: &'a dyn MediaSource,
    artwork: &'a dyn ArtworkSource,
    config: &'a Config,
    output_root: PathBuf,
}

impl<'a> Downloader<'a> {
    pub fn new(
        source: &'a dyn MediaSource,
        artwork: &'a dyn ArtworkSource,
        config: &'a Config,
        output_root: PathBuf,
    ) -> Self {
        Self {
            source,
            artwork,
            config,
            output_root,
        }
    }

    /// Classifies `url` and downloads either the single video or every item
    /// of the playlist.
    pub fn download(&self, url: &str) -> Result<Outcome> {
        let url = url.trim();
        if url.is_empty() {
            bail!("no URL given");
        }

        if url::classify(url) == UrlKind::Playlist {
            println!("Detected playlist URL. Starting playlist download...");
            return self.download_playlist(url).map(Outcome::Playlist);
        }

        // The URL pattern is not conclusive; ask the extractor.
        let listing = self
            .source
            .fetch_playlist(url)
            .with_context(|| format!("cannot resolve {url}"))?;
        if listing.is_playlist() {
            println!("Detected playlist URL. Starting playlist download...");
            return self.download_entries(&listing).map(Outcome::Playlist);
        }

        println!("Detected single video URL. Starting download...");
        self.download_video(url).map(Outcome::Track)
    }

    /// Downloads one video into the output root.
    pub fn download_video(&self, url: &str) -> Result<PathBuf> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.download_into(url, &self.output_root, None, &spinner);
        spinner.finish_and_clear();
        result
    }

    /// Downloads every playlist item into `<output>/<playlist title>`.
    /// Failed items are reported and skipped.
    pub fn download_playlist(&self, url: &str) -> Result<BatchSummary> {
        let info = self
            .source
            .fetch_playlist(url)
            .with_context(|| format!("cannot read playlist {url}"))?;
        self.download_entries(&info)
    }

    fn download_entries(&self, info: &PlaylistInfo) -> Result<BatchSummary> {
        if info.entries.is_empty() {
            bail!("could not find videos in the playlist");
        }

        let title = info.display_title();
        let total = info.entries.len();
        let dir = renamer::output_dir(&self.output_root, Some(title));
        renamer::ensure_dir(&dir)?;
        println!("Found {total} videos in playlist: {title}");

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("Playlist progress {bar:40.cyan/blue} {pos}/{len} videos {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.enable_steady_tick(Duration::from_millis(100));

        let mut summary = BatchSummary::new(total);
        for (i, entry) in info.entries.iter().enumerate() {
            let n = i + 1;
            match entry {
                None => {
                    say(&progress, format!("\n[{n}/{total}] Skipping unavailable entry"));
                    summary.record_failure(format!("#{n}"), "entry unavailable");
                }
                Some(entry) => {
                    let name = entry.display_title();
                    match url::entry_url(entry) {
                        None => {
                            say(
                                &progress,
                                format!("\n[{n}/{total}] Skipping {name}: could not extract video URL"),
                            );
                            summary.record_failure(name, "no video URL");
                        }
                        Some(video_url) => {
                            say(&progress, format!("\n[{n}/{total}] Processing: {name}"));
                            match self.download_into(&video_url, &dir, Some(title), &progress) {
                                Ok(_) => summary.record_success(),
                                Err(e) => {
                                    say(&progress, format!("Error downloading {video_url}: {e:#}"));
                                    summary.record_failure(name, format!("{e:#}"));
                                }
                            }
                        }
                    }
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        println!(
            "\nPlaylist download complete: {}/{} videos were successfully downloaded to '{}'",
            summary.succeeded,
            total,
            dir.display()
        );
        Ok(summary)
    }

    fn download_into(
        &self,
        url: &str,
        dir: &Path,
        playlist_title: Option<&str>,
        progress: &ProgressBar,
    ) -> Result<PathBuf> {
        let info = self
            .source
            .fetch_video(url)
            .with_context(|| format!("cannot read video info for {url}"))?;
        let meta = TrackMetadata::from_video(&info, playlist_title, &self.config.metadata);
        let stem = renamer::build_stem(&meta);

        renamer::ensure_dir(dir)?;
        say(progress, format!("Downloading: {}", meta.summary()));
        progress.set_message(format!("Downloading {stem}"));
        let path = self
            .source
            .download_audio(url, dir, &stem)
            .with_context(|| format!("{} could not download {url}", self.source.name()));
        progress.set_message("");
        let path = path?;

        let meta = match self.fetch_artwork(&info, progress) {
            Some(art) => meta.with_thumbnail(art),
            None => meta,
        };

        say(progress, "Adding metadata to MP3 file...");
        tagger::write_tags(&path, &meta)?;
        say(progress, format!("Success: {}", renamer::build_filename(&meta)));
        Ok(path)
    }

    /// Missing or failing artwork never fails the download.
    fn fetch_artwork(&self, info: &VideoInfo, progress: &ProgressBar) -> Option<Vec<u8>> {
        if !self.config.metadata.embed_thumbnail {
            return None;
        }
        let url = info.thumbnail_url()?;
        match self.artwork.fetch_artwork(url) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("thumbnail {url} unavailable: {e:#}");
                say(progress, format!("Failed to add album art: {e:#}"));
                None
            }
        }
    }
}

/// Prints above the bar. A hidden bar (stdout not a terminal) drops
/// `println`, so fall back to plain stdout there.
fn say(progress: &ProgressBar, msg: impl AsRef<str>) {
    if progress.is_hidden() {
        println!("{}", msg.as_ref());
    } else {
        progress.println(msg);
    }
}
