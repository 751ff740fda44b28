//! Persisted display preferences.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const APP_DIR: &str = "mixtape";
const FILE_NAME: &str = "preferences.json";

/// Result type for preference storage.
pub type PreferenceResult<T> = Result<T, PreferenceError>;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Could not determine a config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Display settings kept between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayPreferences {
    #[serde(default)]
    pub dark_mode: bool,
}

/// JSON file holding [`DisplayPreferences`].
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config_dir>/mixtape/preferences.json`.
    pub fn open_default() -> PreferenceResult<Self> {
        dirs::config_dir()
            .map(|d| Self::new(d.join(APP_DIR).join(FILE_NAME)))
            .ok_or(PreferenceError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences. A missing or unreadable file yields the defaults.
    pub fn load(&self) -> DisplayPreferences {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored preferences");
                return DisplayPreferences::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read preferences");
                return DisplayPreferences::default();
            }
        };

        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring malformed preferences");
            DisplayPreferences::default()
        })
    }

    /// Write preferences, creating parent directories.
    pub fn save(&self, prefs: &DisplayPreferences) -> PreferenceResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(prefs)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), dark_mode = prefs.dark_mode, "Preferences saved");
        Ok(())
    }
}
