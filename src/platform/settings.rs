//! JSON settings file.
//!
//! Holds the window geometry, tick interval, startup flag and the program
//! resolver tables. Stored under the user's config directory.

use crate::mixer::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Window position and size in screen points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last window geometry, restored at startup
    pub window: Option<WindowGeometry>,

    /// Reconciliation interval in milliseconds
    pub tick_interval_ms: u64,

    /// Register in the Windows Run key at launch
    pub start_with_windows: bool,

    /// Extra rename and exclusion entries
    pub resolver: ResolverConfig,
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: None,
            tick_interval_ms: 1000,
            start_with_windows: true,
            resolver: ResolverConfig::default(),
        }
    }
}

/// Settings service error types.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("No config directory available")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// File-based settings service.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    const APP_DIR: &'static str = "VolumeMixer";
    const FILE_NAME: &'static str = "settings.json";

    /// Settings file in the user's config directory.
    pub fn new() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::at(dir.join(Self::APP_DIR).join(Self::FILE_NAME)))
    }

    /// Settings file at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(serde_json::from_str(&contents)?)
    }

    /// Load settings, moving an unparsable file aside first.
    ///
    /// The bad file is renamed to `settings.json.bak` so later saves cannot
    /// overwrite the user's entries; defaults are returned in its place.
    pub fn load_or_backup(&self) -> Result<Settings, SettingsError> {
        match self.load() {
            Err(SettingsError::InvalidJson(e)) => {
                let backup = self.backup_path();
                std::fs::rename(&self.path, &backup).map_err(|source| {
                    SettingsError::WriteFailed {
                        path: backup.clone(),
                        source,
                    }
                })?;
                tracing::warn!(
                    error = %e,
                    backup = %backup.display(),
                    "invalid settings file moved aside, using defaults"
                );
                Ok(Settings::default())
            }
            result => result,
        }
    }

    /// Where `load_or_backup` moves an unparsable file.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Save settings, creating the directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| SettingsError::WriteFailed {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json).map_err(|source| SettingsError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}
