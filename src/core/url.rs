use crate::models::PlaylistEntry;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// What a user-supplied URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Video,
    Playlist,
}

/// Cheap pattern check done before asking the extractor.
pub fn is_playlist_url(url: &str) -> bool {
    url.to_lowercase().contains("playlist") || url.contains("&list=") || url.contains("?list=")
}

/// Classification from the URL alone. A `Video` answer may still turn out to
/// be a playlist once the extractor is asked.
pub fn classify(url: &str) -> UrlKind {
    if is_playlist_url(url) {
        UrlKind::Playlist
    } else {
        UrlKind::Video
    }
}

/// Resolves a flat playlist entry into a downloadable URL.
/// Bare ids are expanded to a YouTube watch URL.
pub fn entry_url(entry: &PlaylistEntry) -> Option<String> {
    let url = entry.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let id = entry.id.as_deref().map(str::trim).filter(|i| !i.is_empty());

    match (url, id) {
        (Some(url), _) if url.starts_with("http") => Some(url.to_string()),
        (Some(video_id), _) | (None, Some(video_id)) => Some(format!("{WATCH_URL}{video_id}")),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Option<&str>, url: Option<&str>) -> PlaylistEntry {
        PlaylistEntry {
            id: id.map(str::to_string),
            url: url.map(str::to_string),
            title: None,
        }
    }

    #[test]
    fn test_is_playlist_url() {
        assert!(is_playlist_url(
            "https://www.youtube.com/playlist?list=PL590L5WQmH8fJ54F369BLDSqIwcs-TCfs"
        ));
        assert!(is_playlist_url("https://www.youtube.com/watch?v=abc&list=PL123"));
        assert!(is_playlist_url("https://youtu.be/abc?list=PL123"));
        assert!(is_playlist_url("https://music.youtube.com/PLAYLIST?x=1"));
        assert!(!is_playlist_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_playlist_url("https://youtu.be/dQw4w9WgXcQ?t=42"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("https://www.youtube.com/watch?v=a&list=b"), UrlKind::Playlist);
        assert_eq!(classify("https://www.youtube.com/watch?v=a"), UrlKind::Video);
    }

    #[test]
    fn test_entry_url_absolute() {
        let e = entry(Some("abc"), Some("https://www.youtube.com/watch?v=abc"));
        assert_eq!(entry_url(&e).as_deref(), Some("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_entry_url_bare_id_in_url_field() {
        let e = entry(None, Some("abc"));
        assert_eq!(entry_url(&e).as_deref(), Some("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_entry_url_from_id() {
        let e = entry(Some("xyz"), None);
        assert_eq!(entry_url(&e).as_deref(), Some("https://www.youtube.com/watch?v=xyz"));
    }

    #[test]
    fn test_entry_url_missing() {
        assert_eq!(entry_url(&entry(None, None)), None);
        assert_eq!(entry_url(&entry(Some(" "), Some(""))), None);
    }
}
