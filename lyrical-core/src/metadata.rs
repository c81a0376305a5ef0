//! Contract with the library that reads and writes audio tags.

use crate::error::Result;
use crate::lrc::{self, LyricLine};
use async_trait::async_trait;

/// Artist shown when the file has none
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Album shown when the file has none
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Attached picture type for the front cover
pub const FRONT_COVER: u8 = 3;

/// An audio file loaded into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    /// Original file name, including extension
    pub name: String,
    pub bytes: Vec<u8>,
}

impl AudioFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// File name without its extension
    #[must_use]
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) if dot + 1 < self.name.len() && !self.name[dot + 1..].contains('/') => {
                &self.name[..dot]
            }
            _ => &self.name,
        }
    }
}

/// Embedded cover art
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub data: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`; may be empty if the container omits it
    pub mime_type: String,
}

/// Tag values exactly as the tag library found them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub cover: Option<CoverArt>,
    /// Text of the unsynchronized lyrics frame
    pub lyrics: Option<String>,
}

/// Track metadata with display fallbacks applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
    pub cover: Option<CoverArt>,
    pub embedded_lyrics: Option<String>,
}

impl TrackMetadata {
    /// Normalize raw tags. Missing or empty values fall back to the file
    /// name (title), [`UNKNOWN_ARTIST`], [`UNKNOWN_ALBUM`] or an empty string.
    #[must_use]
    pub fn from_tags(file: &AudioFile, tags: RawTags) -> Self {
        Self {
            title: non_empty(tags.title).unwrap_or_else(|| file.stem().to_string()),
            artist: non_empty(tags.artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: non_empty(tags.album).unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            year: tags.year.unwrap_or_default(),
            genre: tags.genre.unwrap_or_default(),
            cover: tags.cover.filter(|cover| !cover.data.is_empty()),
            embedded_lyrics: non_empty(tags.lyrics),
        }
    }

    /// Lines parsed from the embedded lyrics frame, empty if there is none
    #[must_use]
    pub fn lyric_lines(&self) -> Vec<LyricLine> {
        lrc::parse_embedded(self.embedded_lyrics.as_deref())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A tag frame to write into the exported container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFrame {
    Title(String),
    Artist(String),
    Album(String),
    UnsyncedLyrics {
        text: String,
        description: String,
        /// ISO 639-2 code, e.g. `eng`
        language: String,
    },
    Picture {
        picture_type: u8,
        mime_type: String,
        description: String,
        data: Vec<u8>,
    },
}

impl TagFrame {
    /// ID3v2 frame identifier
    #[must_use]
    pub const fn frame_id(&self) -> &'static str {
        match self {
            Self::Title(_) => "TIT2",
            Self::Artist(_) => "TPE1",
            Self::Album(_) => "TALB",
            Self::UnsyncedLyrics { .. } => "USLT",
            Self::Picture { .. } => "APIC",
        }
    }
}

/// Reads tags from and writes tags into an audio container.
#[async_trait]
pub trait TagService: Send + Sync {
    /// Get the service name
    fn name(&self) -> &'static str;

    /// Read the tags of `file`
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MetadataRead`](crate::CoreError::MetadataRead) if
    /// the container is malformed or unsupported.
    async fn read(&self, file: &AudioFile) -> Result<RawTags>;

    /// Produce a copy of `file` with `frames` written into its tag
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be written.
    async fn write(&self, file: &AudioFile, frames: &[TagFrame]) -> Result<Vec<u8>>;
}
