use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::TrackMetadata;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Artist/title separators in order of preference.
const SEPARATORS: &[&str] = &[" - ", " – ", " — ", "|"];

/// Bracketed qualifiers YouTube uploaders append to titles.
static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[\(\[]\s*(?:official\s+(?:music\s+|lyric\s+)?(?:video|audio)|(?:official\s+)?visuali[sz]er|lyrics?(?:\s+video)?|audio|video|hd|hq|4k)\s*[\)\]]",
    )
    .unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Guess `(artist, title)` from a video title and its channel name.
///
/// Supported patterns:
/// - "Artist - Title" (also en dash, em dash and `|`)
/// - "Title (Official Video)" with the channel as artist
/// - "Title" (fallback, channel as artist)
///
/// Total over all inputs: empty results fall back to the channel, the raw
/// title and finally to [`UNKNOWN_ARTIST`] / [`UNKNOWN_TITLE`].
pub fn normalize(raw_title: &str, channel_name: &str) -> TrackMetadata {
    let raw_title = raw_title.trim();
    let channel = channel_artist(channel_name);

    let (artist, title) = match split_artist_title(raw_title) {
        Some((artist, title)) => (clean(artist), clean(title)),
        None => (clean(channel), clean(raw_title)),
    };

    let artist = if artist.is_empty() {
        fallback(&[clean(channel).as_str(), channel], UNKNOWN_ARTIST)
    } else {
        artist
    };
    let title = if title.is_empty() {
        fallback(&[raw_title], UNKNOWN_TITLE)
    } else {
        title
    };

    TrackMetadata::new(artist, title)
}

/// Parse an existing file's name into metadata. The containing folder stands
/// in for the channel name.
///
/// Supported patterns:
/// - "Artist - Title.mp3"
/// - "01. Artist - Title.mp3"
/// - "Title.mp3" (artist = folder name)
pub fn parse_filename(path: &Path) -> TrackMetadata {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .trim();
    let folder = folder_name(path).unwrap_or_default();

    let stem = strip_track_number(stem).unwrap_or(stem);
    normalize(stem, folder)
}

/// Name of the directory containing `path`, if it has one.
pub fn folder_name(path: &Path) -> Option<&str> {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
}

/// Split at the first occurrence of the most preferred separator present.
fn split_artist_title(raw: &str) -> Option<(&str, &str)> {
    SEPARATORS.iter().find_map(|sep| raw.split_once(sep))
}

/// Remove noise qualifiers, collapse whitespace and strip dangling
/// separators. Repeats until stable, so `clean(clean(s)) == clean(s)`.
pub fn clean(s: &str) -> String {
    let mut current = clean_once(s);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(s: &str) -> String {
    let without_noise = NOISE.replace_all(s, " ");
    let collapsed = WHITESPACE.replace_all(&without_noise, " ");
    collapsed.trim_matches(is_residual).to_string()
}

fn is_residual(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '–' | '—' | '|' | ':')
}

/// Auto-generated "Artist - Topic" channels carry the artist name.
fn channel_artist(channel: &str) -> &str {
    let channel = channel.trim();
    channel
        .strip_suffix(" - Topic")
        .map(str::trim)
        .unwrap_or(channel)
}

fn fallback(candidates: &[&str], placeholder: &str) -> String {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

/// Strip a leading "01." style track number. Plain digits followed by a
/// space are left alone so names like "50 Cent" survive.
fn strip_track_number(stem: &str) -> Option<&str> {
    let digits = stem.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 3 {
        return None;
    }

    let rest = stem[digits..].strip_prefix('.')?.trim_start();
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}
