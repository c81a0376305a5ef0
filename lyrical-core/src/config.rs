use crate::error::{CoreError, Result};
use crate::transport::DEFAULT_VOLUME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How lyrics and tags are embedded in the exported file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Prepended to the original file name
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Description of the unsynchronized lyrics frame
    #[serde(default = "default_lyrics_description")]
    pub lyrics_description: String,
    /// ISO 639-2 language code of the lyrics frame
    #[serde(default = "default_lyrics_language")]
    pub lyrics_language: String,
    #[serde(default = "default_cover_description")]
    pub cover_description: String,
    /// Used when the source cover art has no MIME type
    #[serde(default = "default_cover_mime")]
    pub default_cover_mime: String,
}

fn default_file_prefix() -> String {
    "[Studio] ".to_string()
}

fn default_lyrics_description() -> String {
    "Lyrics".to_string()
}

fn default_lyrics_language() -> String {
    "eng".to_string()
}

fn default_cover_description() -> String {
    "Cover".to_string()
}

fn default_cover_mime() -> String {
    "image/jpeg".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            lyrics_description: default_lyrics_description(),
            lyrics_language: default_lyrics_language(),
            cover_description: default_cover_description(),
            default_cover_mime: default_cover_mime(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume, 0.0 to 1.0
    #[serde(default = "default_volume")]
    pub volume: f64,
}

const fn default_volume() -> f64 {
    DEFAULT_VOLUME
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to ~/.config/lyrical/lyrical.log
    #[serde(default)]
    pub enabled: bool,
}

impl StudioConfig {
    /// Get the config file path (~/.config/lyrical/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load the config, writing the commented template on first run
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written, read, parsed or
    /// fails validation.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Same as [`StudioConfig::load_or_create`] for an explicit path
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written, read, parsed or
    /// fails validation.
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, CONFIG_TEMPLATE)?;
            info!("Created config template at {}", path.display());
        }

        Self::load_from(path)
    }

    /// Load the config from an existing file
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] if the file does not exist, or an
    /// error if it cannot be read, parsed or fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Whether file logging is enabled in the config file.
    ///
    /// Reads only `logging.enabled` so tracing can be set up before the full
    /// config is loaded. Returns `false` if the file is missing or unreadable.
    #[must_use]
    pub fn file_logging_enabled() -> bool {
        Self::file_logging_enabled_at(&Self::config_path())
    }

    /// Same as [`StudioConfig::file_logging_enabled`] for an explicit path
    #[must_use]
    pub fn file_logging_enabled_at(path: &Path) -> bool {
        #[derive(Deserialize)]
        struct PartialConfig {
            #[serde(default)]
            logging: LoggingConfig,
        }

        let Ok(content) = fs::read_to_string(path) else {
            return false;
        };

        toml::from_str::<PartialConfig>(&content)
            .map(|c| c.logging.enabled)
            .unwrap_or(false)
    }

    /// Parse and validate config text
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigParseError`] for TOML syntax or type errors and
    /// [`CoreError::ConfigInvalid`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let language = &self.export.lyrics_language;
        if language.len() != 3 || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "export.lyrics_language must be a three-letter language code, got {language:?}"
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "playback.volume must be between 0.0 and 1.0, got {}",
                    self.playback.volume
                ),
            });
        }

        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"# Lyrical Studio Configuration
# ~/.config/lyrical/config.toml

[export]
# Prepended to the original file name of the exported audio file
file_prefix = "[Studio] "
# Unsynchronized lyrics frame description and ISO 639-2 language code
lyrics_description = "Lyrics"
lyrics_language = "eng"
# Cover art frame description, and the MIME type used when the source has none
cover_description = "Cover"
default_cover_mime = "image/jpeg"

[playback]
# Initial volume between 0.0 and 1.0
volume = 0.8

[logging]
# Also write logs to ~/.config/lyrical/lyrical.log
enabled = false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StudioConfig::from_toml_str("").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.export.file_prefix, "[Studio] ");
        assert_eq!(config.export.lyrics_language, "eng");
        assert_eq!(config.playback.volume, 0.8);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_template_matches_defaults() {
        let config = StudioConfig::from_toml_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, StudioConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = StudioConfig::from_toml_str(
            r#"
[export]
file_prefix = "synced-"
lyrics_language = "zho"

[logging]
enabled = true
"#,
        )
        .unwrap();
        assert_eq!(config.export.file_prefix, "synced-");
        assert_eq!(config.export.lyrics_language, "zho");
        assert_eq!(config.export.lyrics_description, "Lyrics");
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_invalid_language() {
        let result = StudioConfig::from_toml_str("[export]\nlyrics_language = \"en\"");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_invalid_volume() {
        let result = StudioConfig::from_toml_str("[playback]\nvolume = 1.5");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_parse_error() {
        let result = StudioConfig::from_toml_str("[playback\nvolume = ");
        assert!(matches!(result, Err(CoreError::ConfigParseError(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            StudioConfig::load_from(&path),
            Err(CoreError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_load_or_create_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(crate::paths::CONFIG_FILE_NAME);

        let config = StudioConfig::load_or_create_at(&path).unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        fs::write(&path, "[playback]\nvolume = 0.25\n").unwrap();
        let config = StudioConfig::load_or_create_at(&path).unwrap();
        assert_eq!(config.playback.volume, 0.25);
    }

    #[test]
    fn test_file_logging_enabled_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(!StudioConfig::file_logging_enabled_at(&path));

        fs::write(&path, "[logging]\nenabled = true\n").unwrap();
        assert!(StudioConfig::file_logging_enabled_at(&path));

        // Other sections failing validation do not hide the logging flag
        let invalid_volume = "[playback]\nvolume = 7.0\n[logging]\nenabled = true\n";
        fs::write(&path, invalid_volume).unwrap();
        assert!(StudioConfig::file_logging_enabled_at(&path));

        fs::write(&path, "[logging\nenabled = true").unwrap();
        assert!(!StudioConfig::file_logging_enabled_at(&path));
    }
}
