use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    // Sync engine errors
    #[error("No lyric lines to sync - import or add some lyrics first")]
    NoLines,

    #[error("Line {index} is the last line, there is no further line to sync")]
    NoMoreLines { index: usize },

    #[error("Imported text contains no lyric lines")]
    EmptyImport,

    #[error("No lyric line with id {id}")]
    LineNotFound { id: Uuid },

    #[error("Line index {index} is out of range for {len} lines")]
    LineOutOfRange { index: usize, len: usize },

    #[error("Cannot apply {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    // Metadata errors
    #[error("Failed to read audio metadata: {reason}")]
    MetadataRead { reason: String },

    #[error("Export failed: {reason}")]
    ExportFailed { reason: String },

    // Configuration errors
    #[error("Config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether this error should be surfaced to the user as a blocking notice
    /// rather than silently dropped by the editing surface.
    #[must_use]
    pub const fn is_user_notice(&self) -> bool {
        matches!(
            self,
            Self::NoLines
                | Self::NoMoreLines { .. }
                | Self::EmptyImport
                | Self::MetadataRead { .. }
                | Self::ExportFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_notice_classification() {
        assert!(CoreError::NoLines.is_user_notice());
        assert!(CoreError::NoMoreLines { index: 4 }.is_user_notice());
        assert!(CoreError::EmptyImport.is_user_notice());
        assert!(!CoreError::InvalidTransition {
            action: "mark",
            status: "idle"
        }
        .is_user_notice());
    }

    #[test]
    fn test_no_more_lines_message() {
        let err = CoreError::NoMoreLines { index: 4 };
        assert_eq!(
            err.to_string(),
            "Line 4 is the last line, there is no further line to sync"
        );
    }
}
