use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::TrackMetadata;

/// Replaces characters that are illegal in file names on any common
/// filesystem (`/ \ : * ? " < > |`, NUL, control characters) with `_`.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                return '_';
            }
            if c.is_control() {
                return '_';
            }
            c
        })
        .collect()
}

/// `"{artist} - {title}.mp3"` with both parts sanitized.
pub fn build_filename(meta: &TrackMetadata) -> String {
    format!("{}.mp3", build_stem(meta))
}

/// File name without the extension; yt-dlp appends the extension itself.
pub fn build_stem(meta: &TrackMetadata) -> String {
    format!(
        "{} - {}",
        sanitize_filename(meta.artist().trim()),
        sanitize_filename(meta.title().trim())
    )
}

/// Directory name for a playlist. Windows rejects trailing dots and spaces.
pub fn playlist_dir_name(title: &str) -> String {
    let name = sanitize_filename(title.trim());
    let name = name.trim_end_matches(['.', ' ']);
    if name.is_empty() {
        "YouTube Playlist".to_string()
    } else {
        name.to_string()
    }
}

/// Output directory for a download: the configured root for single videos,
/// `<root>/<playlist>` for playlist items.
pub fn output_dir(root: &Path, playlist_title: Option<&str>) -> PathBuf {
    match playlist_title {
        Some(title) => root.join(playlist_dir_name(title)),
        None => root.to_path_buf(),
    }
}

/// Creates the directory (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create directory {}", dir.display()))
}
