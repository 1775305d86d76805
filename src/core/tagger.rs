use std::path::Path;

use anyhow::{Context, Result};
use id3::frame::{Comment, Picture, PictureType};
use id3::{Tag, TagLike, Version};

use crate::models::TrackMetadata;

/// Writes `meta` into the MP3 at `path` as an ID3v2.4 tag.
/// Frames already present but not covered by `meta` are preserved.
pub fn write_tags(path: &Path, meta: &TrackMetadata) -> Result<()> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => Tag::new(),
        Err(e) => {
            log::debug!("discarding unreadable tag in {}: {}", path.display(), e);
            Tag::new()
        }
    };

    tag.set_title(meta.title());
    tag.set_artist(meta.artist());
    if let Some(album) = meta.album() {
        tag.set_album(album);
    }
    if let Some(year) = meta.year() {
        tag.set_year(year);
    }
    if let Some(genre) = meta.genre() {
        tag.set_genre(genre);
    }
    if let Some(comment) = meta.comment() {
        tag.remove_comment(Some(""), None);
        tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: comment.to_string(),
        });
    }
    if let Some(art_data) = meta.thumbnail() {
        tag.remove_all_pictures();
        tag.add_frame(Picture {
            mime_type: detect_mime_type(art_data).to_string(),
            picture_type: PictureType::CoverFront,
            description: "Cover".to_string(),
            data: art_data.to_vec(),
        });
    }

    tag.write_to_path(path, Version::Id3v24)
        .with_context(|| format!("cannot write tags to {}", path.display()))?;
    Ok(())
}

/// Detects the image MIME type from its magic bytes.
fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(&b"WEBP"[..]) {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
