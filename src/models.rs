use serde::Deserialize;

use crate::config::MetadataConfig;
use crate::core::parser;

/// Metadata for one downloaded track.
///
/// `artist` and `title` are never empty; `normalize` is the only constructor
/// and falls back to placeholders. Optional fields are filled through the
/// consuming `with_*` methods before the value is handed to the tag writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    artist: String,
    title: String,
    album: Option<String>,
    year: Option<i32>,
    genre: Option<String>,
    comment: Option<String>,
    thumbnail: Option<Vec<u8>>,
}

impl TrackMetadata {
    pub(crate) fn new(artist: String, title: String) -> Self {
        debug_assert!(!artist.is_empty() && !title.is_empty());
        Self {
            artist,
            title,
            album: None,
            year: None,
            genre: None,
            comment: None,
            thumbnail: None,
        }
    }

    /// Builds the full tag set for a video as reported by the extractor.
    /// `playlist_title` takes precedence over any album the extractor knows.
    pub fn from_video(
        info: &VideoInfo,
        playlist_title: Option<&str>,
        cfg: &MetadataConfig,
    ) -> Self {
        let album = non_empty(playlist_title)
            .or_else(|| non_empty(info.album.as_deref()))
            .unwrap_or(cfg.default_album.as_str())
            .to_string();

        let genre = non_empty(info.genre.as_deref())
            .or_else(|| info.categories.iter().map(String::as_str).find(|c| !c.is_empty()))
            .unwrap_or(cfg.default_genre.as_str())
            .to_string();

        let comment = non_empty(info.description.as_deref())
            .map(|d| truncate_chars(d.trim(), cfg.comment_limit));

        parser::normalize(info.title.as_deref().unwrap_or_default(), info.channel_name())
            .with_album(album)
            .with_year(info.year())
            .with_genre(genre)
            .with_comment(comment)
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        let album = album.into();
        self.album = (!album.trim().is_empty()).then_some(album);
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        let genre = genre.into();
        self.genre = (!genre.trim().is_empty()).then_some(genre);
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.is_empty());
        self
    }

    pub fn with_thumbnail(mut self, data: Vec<u8>) -> Self {
        self.thumbnail = (!data.is_empty()).then_some(data);
        self
    }

    pub fn summary(&self) -> String {
        match self.album() {
            Some(album) => format!("{} - {} [{}]", self.artist, self.title, album),
            None => format!("{} - {}", self.artist, self.title),
        }
    }
}

/// Subset of `yt-dlp --dump-single-json` output for a single video.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub release_year: Option<i32>,
    pub upload_date: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

/// One entry of yt-dlp's `thumbnails` list.
#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl VideoInfo {
    /// Uploader name used as the artist fallback.
    pub fn channel_name(&self) -> &str {
        non_empty(self.uploader.as_deref())
            .or_else(|| non_empty(self.channel.as_deref()))
            .or_else(|| non_empty(self.artist.as_deref()))
            .unwrap_or_default()
    }

    /// Release year, or the year part of the `YYYYMMDD` upload date.
    pub fn year(&self) -> Option<i32> {
        self.release_year.or_else(|| {
            self.upload_date
                .as_deref()
                .and_then(|d| d.get(..4))
                .and_then(|y| y.parse().ok())
        })
    }

    /// yt-dlp lists thumbnails from smallest to largest.
    pub fn thumbnail_url(&self) -> Option<&str> {
        non_empty(self.thumbnail.as_deref())
            .or_else(|| self.thumbnails.last().map(|t| t.url.as_str()))
    }
}

/// Flat playlist extraction result. Single videos come back with
/// `_type == "video"` and no entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistInfo {
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<Option<PlaylistEntry>>,
}

impl PlaylistInfo {
    pub fn is_playlist(&self) -> bool {
        self.kind.as_deref() == Some("playlist")
    }

    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or("YouTube Playlist")
    }
}

/// A flat playlist item; `url` may be a bare video id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistEntry {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl PlaylistEntry {
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or("Untitled")
    }
}

/// Outcome of a sequential batch (playlist download or retag run).
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, item: impl Into<String>, reason: impl Into<String>) {
        self.failures.push((item.into(), reason.into()));
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str, uploader: &str) -> VideoInfo {
        VideoInfo {
            title: Some(title.to_string()),
            uploader: Some(uploader.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_video_defaults() {
        let info = video("Daft Punk - One More Time (Official Video)", "Daft Punk");
        let meta = TrackMetadata::from_video(&info, None, &MetadataConfig::default());
        assert_eq!(meta.artist(), "Daft Punk");
        assert_eq!(meta.title(), "One More Time");
        assert_eq!(meta.album(), Some("YouTube Music"));
        assert_eq!(meta.genre(), Some("Music"));
        assert_eq!(meta.year(), None);
        assert_eq!(meta.comment(), None);
    }

    #[test]
    fn test_from_video_playlist_album_wins() {
        let mut info = video("Intro", "Some Band");
        info.album = Some("Real Album".to_string());
        let meta =
            TrackMetadata::from_video(&info, Some("Road Trip Mix"), &MetadataConfig::default());
        assert_eq!(meta.album(), Some("Road Trip Mix"));
        assert_eq!(meta.artist(), "Some Band");
    }

    #[test]
    fn test_from_video_year_genre_comment() {
        let mut info = video("Song", "Channel");
        info.upload_date = Some("20190412".to_string());
        info.categories = vec!["Entertainment".to_string()];
        info.description = Some("x".repeat(400));
        let meta = TrackMetadata::from_video(&info, None, &MetadataConfig::default());
        assert_eq!(meta.year(), Some(2019));
        assert_eq!(meta.genre(), Some("Entertainment"));
        assert_eq!(meta.comment().map(|c| c.chars().count()), Some(250));
    }

    #[test]
    fn test_release_year_preferred() {
        let mut info = video("Song", "Channel");
        info.release_year = Some(1999);
        info.upload_date = Some("20190412".to_string());
        assert_eq!(info.year(), Some(1999));
    }

    #[test]
    fn test_channel_name_fallbacks() {
        let info = VideoInfo {
            channel: Some("The Channel".to_string()),
            uploader: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(info.channel_name(), "The Channel");
        assert_eq!(VideoInfo::default().channel_name(), "");
    }

    #[test]
    fn test_thumbnail_url_falls_back_to_largest() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"title": "t", "thumbnails": [{"url": "small.jpg"}, {"url": "big.jpg"}]}"#,
        )
        .unwrap();
        assert_eq!(info.thumbnail_url(), Some("big.jpg"));
    }

    #[test]
    fn test_playlist_info_parses_null_entries() {
        let info: PlaylistInfo = serde_json::from_str(
            r#"{"_type": "playlist", "title": "Mix", "entries": [null, {"id": "abc", "title": "One"}]}"#,
        )
        .unwrap();
        assert!(info.is_playlist());
        assert_eq!(info.entries.len(), 2);
        assert!(info.entries[0].is_none());
    }

    #[test]
    fn test_summary() {
        let meta = parser::normalize("IU - Blueming", "").with_album("Love poem");
        assert_eq!(meta.summary(), "IU - Blueming [Love poem]");
    }
}
