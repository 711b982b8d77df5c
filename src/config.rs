//! Reader settings.
//!
//! Settings come from an optional JSON file; every field has a default, so a
//! partial file (or none at all) is fine.
//!
//! ```
//! use lector::config::ReaderConfig;
//!
//! let config: ReaderConfig = serde_json::from_str(r#"{ "default_wpm": 450 }"#).unwrap();
//! assert_eq!(config.default_wpm, 450);
//! assert_eq!(config.autosave_interval_ms, 5000);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Slowest supported reading speed, in words per minute.
pub const MIN_WPM: u32 = 100;
/// Fastest supported reading speed, in words per minute.
pub const MAX_WPM: u32 = 1200;
/// Increment used by the faster/slower controls.
pub const WPM_STEP: u32 = 50;
pub const DEFAULT_WPM: u32 = 300;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "LECTOR_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".lector";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Initial speed of a new reading session.
    pub default_wpm: u32,
    /// Pause between the last word of a chapter and the first of the next.
    pub chapter_settle_ms: u64,
    /// How often a reading session persists progress.
    pub autosave_interval_ms: u64,
    /// Where books and progress live. Falls back to [`DATA_DIR_ENV`], then
    /// `.lector` in the working directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            default_wpm: DEFAULT_WPM,
            chapter_settle_ms: 1000,
            autosave_interval_ms: 5000,
            data_dir: None,
        }
    }
}

impl ReaderConfig {
    /// Load settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ReaderConfig = serde_json::from_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn chapter_settle(&self) -> Duration {
        Duration::from_millis(self.chapter_settle_ms)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    /// Starting speed, clamped to the supported range.
    pub fn initial_wpm(&self) -> u32 {
        clamp_wpm(self.default_wpm)
    }

    /// The data directory: explicit setting, then the environment, then the
    /// default relative path.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

/// Clamp a speed to `[MIN_WPM, MAX_WPM]`.
pub const fn clamp_wpm(wpm: u32) -> u32 {
    if wpm < MIN_WPM {
        MIN_WPM
    } else if wpm > MAX_WPM {
        MAX_WPM
    } else {
        wpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.default_wpm, 300);
        assert_eq!(config.chapter_settle(), Duration::from_secs(1));
        assert_eq!(config.autosave_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_json() {
        let config: ReaderConfig = serde_json::from_str(r#"{"chapter_settle_ms": 0}"#).unwrap();
        assert_eq!(config.chapter_settle_ms, 0);
        assert_eq!(config.default_wpm, DEFAULT_WPM);
    }

    #[test]
    fn test_clamp_wpm() {
        assert_eq!(clamp_wpm(50), MIN_WPM);
        assert_eq!(clamp_wpm(5000), MAX_WPM);
        assert_eq!(clamp_wpm(350), 350);
        let config = ReaderConfig {
            default_wpm: 10,
            ..Default::default()
        };
        assert_eq!(config.initial_wpm(), MIN_WPM);
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = ReaderConfig {
            data_dir: Some(PathBuf::from("/tmp/books")),
            ..Default::default()
        };
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/tmp/books"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lector.json");
        std::fs::write(&path, r#"{"default_wpm": 600, "data_dir": "books"}"#).unwrap();
        let config = ReaderConfig::from_file(&path).unwrap();
        assert_eq!(config.default_wpm, 600);
        assert_eq!(config.data_dir, Some(PathBuf::from("books")));
    }

    #[test]
    fn test_from_file_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lector.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ReaderConfig::from_file(&path),
            Err(crate::Error::Json(_))
        ));
    }
}
