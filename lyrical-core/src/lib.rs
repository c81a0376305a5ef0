pub mod config;
pub mod error;
pub mod export;
pub mod lrc;
pub mod metadata;
pub mod paths;
pub mod session;
pub mod time;
pub mod transport;

pub use config::{ExportConfig, LoggingConfig, PlaybackConfig, StudioConfig};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use error::{CoreError, Result};
pub use export::{build_frames, export_file_name, ExportedFile};
pub use lrc::LyricLine;
pub use metadata::{AudioFile, CoverArt, RawTags, TagFrame, TagService, TrackMetadata};
pub use paths::{config_dir, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME};
pub use session::{Session, SyncAction, SyncStatus, Transition};
pub use transport::{PlaybackState, Transport, TransportCommand, TransportEvent};
