use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::MetadataConfig;
use crate::core::{parser, scanner, tagger};
use crate::models::{BatchSummary, TrackMetadata};

/// One processed file and either the tags written to it or the failure.
pub struct RetagEntry {
    pub path: PathBuf,
    pub outcome: Result<TrackMetadata, String>,
}

/// Per-file results of a retag run, in path order.
pub struct RetagReport {
    pub entries: Vec<RetagEntry>,
    pub summary: BatchSummary,
}

/// Re-derives tags for every MP3 under `dir` from its file name. The
/// containing folder becomes the album and, without an "Artist - Title"
/// name, the artist. Per-file failures are collected, not returned.
pub fn retag_directory(dir: &Path, cfg: &MetadataConfig) -> Result<RetagReport> {
    let dir = std::fs::canonicalize(dir)
        .with_context(|| format!("cannot open {}", dir.display()))?;
    let files = scanner::scan_directory(&dir)?;

    let mut summary = BatchSummary::new(files.len());
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let meta = metadata_from_path(&path, cfg);
        let outcome = match tagger::write_tags(&path, &meta) {
            Ok(()) => {
                summary.record_success();
                Ok(meta)
            }
            Err(e) => {
                let reason = format!("{e:#}");
                log::warn!("{}: {}", path.display(), reason);
                summary.record_failure(path.display().to_string(), reason.clone());
                Err(reason)
            }
        };
        entries.push(RetagEntry { path, outcome });
    }

    Ok(RetagReport { entries, summary })
}

fn metadata_from_path(path: &Path, cfg: &MetadataConfig) -> TrackMetadata {
    let album = parser::folder_name(path).unwrap_or_default().to_string();
    parser::parse_filename(path)
        .with_album(album)
        .with_genre(cfg.default_genre.clone())
}
