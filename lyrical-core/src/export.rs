//! Embedding synced lyrics and track tags into an exported audio file.

use crate::config::ExportConfig;
use crate::error::{CoreError, Result};
use crate::lrc::{self, LyricLine};
use crate::metadata::{AudioFile, TagFrame, TagService, TrackMetadata, FRONT_COVER};
use tracing::{info, warn};

/// A finished export, ready to be saved or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Name of the exported file: the configured prefix followed by the original name
#[must_use]
pub fn export_file_name(options: &ExportConfig, original: &str) -> String {
    format!("{}{}", options.file_prefix, original)
}

/// Build the frames to write, lyrics first.
///
/// Title, artist and album are only written when non-empty, and the cover
/// only when the track has one.
#[must_use]
pub fn build_frames(
    meta: &TrackMetadata,
    lyrics: String,
    options: &ExportConfig,
) -> Vec<TagFrame> {
    let mut frames = vec![TagFrame::UnsyncedLyrics {
        text: lyrics,
        description: options.lyrics_description.clone(),
        language: options.lyrics_language.clone(),
    }];

    if !meta.title.is_empty() {
        frames.push(TagFrame::Title(meta.title.clone()));
    }
    if !meta.artist.is_empty() {
        frames.push(TagFrame::Artist(meta.artist.clone()));
    }
    if !meta.album.is_empty() {
        frames.push(TagFrame::Album(meta.album.clone()));
    }
    if let Some(ref cover) = meta.cover {
        let mime_type = if cover.mime_type.is_empty() {
            options.default_cover_mime.clone()
        } else {
            cover.mime_type.clone()
        };
        frames.push(TagFrame::Picture {
            picture_type: FRONT_COVER,
            mime_type,
            description: options.cover_description.clone(),
            data: cover.data.clone(),
        });
    }

    frames
}

/// Serialize `lines` and write them, with the track tags, into a copy of `file`.
///
/// # Errors
///
/// Returns [`CoreError::ExportFailed`] if the tag service cannot write the
/// file. No partial output is returned in that case.
pub async fn export(
    service: &dyn TagService,
    file: &AudioFile,
    meta: &TrackMetadata,
    lines: &[LyricLine],
    options: &ExportConfig,
) -> Result<ExportedFile> {
    let frames = build_frames(meta, lrc::serialize(lines), options);

    let bytes = service.write(file, &frames).await.map_err(|e| {
        warn!("{} failed to write tags for {}: {}", service.name(), file.name, e);
        match e {
            CoreError::ExportFailed { .. } => e,
            other => CoreError::ExportFailed {
                reason: other.to_string(),
            },
        }
    })?;

    let name = export_file_name(options, &file.name);
    info!("Exported {} ({} frames, {} bytes)", name, frames.len(), bytes.len());

    Ok(ExportedFile { name, bytes })
}
